//! Procedural macros for the `subcase` test-authoring layer.
//!
//! - `#[subject_case]`: collects the `test*` methods of an inherent impl block (and their `#[args(...)]` markers)
//!   into a `subcase::TestSuite` implementation.
//! - `IntoValue`: converts a struct into a `subcase::Value::Object` so subjects can return user records.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Expr, ExprLit, Fields, ImplItem, ItemImpl, Lit, Meta, parse_macro_input};

/// Method-name prefix that marks a test, as in `unittest`.
const TEST_PREFIX: &str = "test";

/// Marker attribute carrying a test method's declared arguments.
const ARGS_ATTR: &str = "args";

/// Collects the test methods of an impl block into a `TestSuite` implementation.
///
/// Every method whose name starts with `test` becomes a test. A test method is an associated function taking the
/// per-test case, and may carry one `#[args(...)]` marker declaring the arguments its subject receives:
///
/// ```ignore
/// #[subject_case]
/// impl TestAdd {
///     /// Adding two ints.
///     #[args(a = 2, b = -6)]
///     fn test_add_int_to_int(case: &mut Case<Self>) -> CaseResult {
///         case.assert_result(-4)
///     }
/// }
///
/// // Generates (besides the impl block itself, with `#[args]` stripped):
/// impl subcase::TestSuite for TestAdd {
///     fn suite() -> subcase::Suite<Self> {
///         subcase::Suite::new("TestAdd")
///             .test(subcase::TestMethod::new("test_add_int_to_int", <TestAdd>::test_add_int_to_int)
///                 .with_doc("Adding two ints."))
///             .declare("test_add_int_to_int", subcase::args!(a = 2, b = -6))
///     }
/// }
/// ```
///
/// Methods keep their names, docs and signatures; only the `#[args]` markers are removed.
#[proc_macro_attribute]
pub fn subject_case(attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        let attr = TokenStream2::from(attr);
        return syn::Error::new_spanned(attr, "`#[subject_case]` takes no arguments")
            .to_compile_error()
            .into();
    }
    let mut item_impl = parse_macro_input!(item as ItemImpl);
    match expand_subject_case(&mut item_impl) {
        Ok(suite_impl) => quote! {
            #item_impl
            #suite_impl
        }
        .into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand_subject_case(item_impl: &mut ItemImpl) -> syn::Result<TokenStream2> {
    if let Some((_, path, _)) = &item_impl.trait_ {
        return Err(syn::Error::new_spanned(
            path,
            "`#[subject_case]` applies to inherent impl blocks, not trait impls",
        ));
    }

    let self_ty = item_impl.self_ty.clone();
    let class_name = quote!(#self_ty).to_string().replace(' ', "");
    let mut entries = Vec::new();

    for impl_item in &mut item_impl.items {
        let ImplItem::Fn(method) = impl_item else {
            continue;
        };

        let mut declared: Vec<Attribute> = Vec::new();
        method.attrs.retain(|attr| {
            if attr.path().is_ident(ARGS_ATTR) {
                declared.push(attr.clone());
                false
            } else {
                true
            }
        });
        if let Some(extra) = declared.get(1) {
            return Err(syn::Error::new_spanned(
                extra,
                "a test method takes a single `#[args(...)]`",
            ));
        }

        let ident = method.sig.ident.clone();
        let name = ident.to_string();
        if !name.starts_with(TEST_PREFIX) {
            if let Some(attr) = declared.first() {
                return Err(syn::Error::new_spanned(
                    attr,
                    format!("`#[args]` on `{name}` has no effect: only methods named `test*` are collected"),
                ));
            }
            continue;
        }
        if let Some(receiver) = method.sig.receiver() {
            return Err(syn::Error::new_spanned(
                receiver,
                "test methods take `case: &mut Case<Self>` instead of a `self` receiver",
            ));
        }

        let doc = doc_text(&method.attrs);
        let declare = match declared.first() {
            Some(attr) => {
                let tokens = args_tokens(attr)?;
                Some(quote! { .declare(#name, ::subcase::args!(#tokens)) })
            }
            None => None,
        };
        entries.push(quote! {
            .test(::subcase::TestMethod::new(#name, <#self_ty>::#ident).with_doc(#doc))
            #declare
        });
    }

    let (impl_generics, _, where_clause) = item_impl.generics.split_for_impl();
    Ok(quote! {
        impl #impl_generics ::subcase::TestSuite for #self_ty #where_clause {
            fn suite() -> ::subcase::Suite<Self> {
                ::subcase::Suite::new(#class_name)
                    #(#entries)*
            }
        }
    })
}

/// Extract the tokens inside `#[args(...)]`; a bare `#[args]` declares an empty set.
fn args_tokens(attr: &Attribute) -> syn::Result<TokenStream2> {
    match &attr.meta {
        Meta::List(list) => Ok(list.tokens.clone()),
        Meta::Path(_) => Ok(TokenStream2::new()),
        Meta::NameValue(nv) => Err(syn::Error::new_spanned(
            nv,
            "expected `#[args(value, name = value, ...)]`",
        )),
    }
}

/// Join `///` doc lines the way rustdoc shows them.
fn doc_text(attrs: &[Attribute]) -> String {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(ExprLit { lit: Lit::Str(s), .. }) => Some(s.value().trim().to_string()),
                _ => None,
            },
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Generates `From<T> for subcase::Value`, turning the struct into an object value.
///
/// # Example
/// ```ignore
/// #[derive(IntoValue)]
/// struct Point {
///     x: i64,
///     y: i64,
/// }
///
/// // Generates:
/// impl From<Point> for subcase::Value {
///     fn from(value: Point) -> Self {
///         subcase::Value::from(subcase::Object::new("Point").with_attr("x", value.x).with_attr("y", value.y))
///     }
/// }
/// ```
///
/// Every field type must itself convert into `Value`.
#[proc_macro_derive(IntoValue)]
pub fn derive_into_value(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let name_str = name.to_string();

    let (field_names, accessors): (Vec<String>, Vec<TokenStream2>) = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => fields
                .named
                .iter()
                .filter_map(|f| {
                    let ident = f.ident.as_ref()?;
                    Some((ident.to_string(), quote!(#ident)))
                })
                .unzip(),
            Fields::Unnamed(fields) => (0..fields.unnamed.len())
                .map(|i| {
                    let index = syn::Index::from(i);
                    (i.to_string(), quote!(#index))
                })
                .unzip(),
            Fields::Unit => (vec![], vec![]),
        },
        _ => {
            return syn::Error::new_spanned(name, "`IntoValue` can only be derived for structs")
                .to_compile_error()
                .into();
        }
    };

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let expanded = quote! {
        impl #impl_generics ::core::convert::From<#name #ty_generics> for ::subcase::Value #where_clause {
            fn from(value: #name #ty_generics) -> Self {
                ::subcase::Value::from(
                    ::subcase::Object::new(#name_str)
                        #(.with_attr(#field_names, value.#accessors))*
                )
            }
        }
    };

    TokenStream::from(expanded)
}
