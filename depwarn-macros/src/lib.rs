use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, punctuated::Punctuated, Expr, ItemFn, LitStr, MetaNameValue, Token};

/// Parsed `#[deprecate(...)]` attributes
struct DeprecateAttributes {
    namespace: LitStr,
    message: Option<LitStr>,
}

/// Read a string literal out of a `key = "value"` pair
fn parse_str_attribute(nv: &MetaNameValue, key: &str) -> Result<LitStr, TokenStream2> {
    match &nv.value {
        Expr::Lit(expr_lit) => match &expr_lit.lit {
            syn::Lit::Str(s) => Ok(s.clone()),
            _ => {
                let msg = format!("Invalid literal for `{}`: expected string", key);
                Err(quote! { compile_error!(#msg); })
            }
        },
        _ => {
            let msg = format!("Invalid syntax for `{}`: expected `{} = \"...\"`", key, key);
            Err(quote! { compile_error!(#msg); })
        }
    }
}

/// Parse macro attributes from the attribute token stream
fn parse_attributes(attr: TokenStream2) -> Result<DeprecateAttributes, TokenStream2> {
    use syn::parse::Parser;

    let parser = Punctuated::<MetaNameValue, Token![,]>::parse_terminated;
    let parsed_args = parser.parse2(attr).map_err(|e| {
        let msg = format!("Failed to parse attributes: {}", e);
        quote! { compile_error!(#msg); }
    })?;

    let mut namespace = None;
    let mut message = None;

    for nv in parsed_args {
        if nv.path.is_ident("namespace") {
            let lit = parse_str_attribute(&nv, "namespace")?;
            if lit.value().trim().is_empty() {
                return Err(quote! { compile_error!("`namespace` must not be empty"); });
            }
            namespace = Some(lit);
        } else if nv.path.is_ident("message") {
            message = Some(parse_str_attribute(&nv, "message")?);
        } else {
            return Err(
                quote! { compile_error!("Unknown attribute: expected `namespace` or `message`"); },
            );
        }
    }

    let namespace = namespace.ok_or_else(|| {
        quote! { compile_error!("Missing required attribute: `namespace = \"...\"`"); }
    })?;

    Ok(DeprecateAttributes { namespace, message })
}

/// Marks a function or method as deprecated at runtime.
///
/// Every call raises a deprecation notice through the global registry, once
/// per call site, honoring `NO_DEPRECATION` and
/// `TRACE_DEPRECATION`. The function is made `#[track_caller]`, so the reported
/// site is the caller's code.
///
/// # Macro Parameters
///
/// - `namespace` (required): the deprecation namespace, usually the crate name.
/// - `message` (optional): the notice text. Default: the function name.
///
/// # Examples
///
/// ```ignore
/// use depwarn::deprecate;
///
/// #[deprecate(namespace = "my-lib", message = "old_sum() is deprecated, use sum()")]
/// pub fn old_sum(a: i32, b: i32) -> i32 {
///     a + b
/// }
///
/// struct Client;
///
/// impl Client {
///     // message defaults to "connect_v1"
///     #[deprecate(namespace = "my-lib")]
///     pub fn connect_v1(&self) -> bool {
///         true
///     }
/// }
/// ```
///
/// # Limitations
///
/// The generated code refers to the `depwarn` crate, so the attribute is used
/// through `depwarn::deprecate`.
///
/// `async fn` is rejected: the caller location cannot be tracked across an
/// `.await` boundary.
#[proc_macro_attribute]
pub fn deprecate(attr: TokenStream, item: TokenStream) -> TokenStream {
    let attrs = match parse_attributes(attr.into()) {
        Ok(attrs) => attrs,
        Err(err) => return err.into(),
    };

    let input = parse_macro_input!(item as ItemFn);
    TokenStream::from(expand(attrs, input))
}

/// Generate the instrumented function
fn expand(attrs: DeprecateAttributes, input: ItemFn) -> TokenStream2 {
    let fn_attrs = &input.attrs;
    let vis = &input.vis;
    let sig = &input.sig;
    let stmts = &input.block.stmts;

    if sig.asyncness.is_some() {
        return quote! { compile_error!("#[deprecate] cannot be used on async functions"); };
    }

    let namespace = &attrs.namespace;
    let message = attrs
        .message
        .unwrap_or_else(|| LitStr::new(&sig.ident.to_string(), sig.ident.span()));

    let already_tracked = fn_attrs.iter().any(|a| a.path().is_ident("track_caller"));
    let track_caller = if already_tracked {
        quote! {}
    } else {
        quote! { #[track_caller] }
    };

    quote! {
        #(#fn_attrs)*
        #track_caller
        #vis #sig {
            {
                static __DEPWARN_EMITTER: ::std::sync::OnceLock<
                    ::std::option::Option<::depwarn::__private::Emitter>,
                > = ::std::sync::OnceLock::new();

                let __caller = ::std::panic::Location::caller();
                if let ::std::option::Option::Some(__emitter) = __DEPWARN_EMITTER
                    .get_or_init(|| ::depwarn::__private::Emitter::global(#namespace).ok())
                {
                    __emitter.deprecate_at(__caller, #message);
                }
            }
            let __depwarn_active = ::depwarn::__private::ActiveSiteGuard::enter(
                ::std::panic::Location::caller(),
                ::std::file!(),
            );
            #(#stmts)*
        }
    }
}
