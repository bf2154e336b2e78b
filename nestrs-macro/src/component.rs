use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parse::Parse, parse::ParseStream, parse_macro_input, Attribute, Data, DeriveInput, Fields,
    Ident, LitStr, Meta, Token, Type,
};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Kind {
    Controller,
    Service,
}

/// `#[controller(base_url = "/users")]`; `path` is accepted as an alias
struct ControllerArgs {
    base_url: Option<LitStr>,
}

impl Parse for ControllerArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut base_url = None;
        while !input.is_empty() {
            let name: Ident = input.parse()?;
            input.parse::<Token![=]>()?;
            if name == "base_url" || name == "path" {
                base_url = Some(input.parse()?);
            } else {
                return Err(syn::Error::new(
                    name.span(),
                    "unknown controller argument, expected `base_url`",
                ));
            }
            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }
        Ok(ControllerArgs { base_url })
    }
}

/// Metadata collected from one struct field
struct FieldSpec {
    ident: Ident,
    inject: Option<LitStr>,
    route: Option<LitStr>,
    http: Option<LitStr>,
}

pub fn derive_controller(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input, Kind::Controller)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

pub fn derive_service(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input, Kind::Service)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput, kind: Kind) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let type_name = struct_name.to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = collect_fields(input)?;

    let metadata_ctor = match kind {
        Kind::Controller => {
            let base_url = match controller_args(&input.attrs)? {
                Some(lit) => quote!(::core::option::Option::Some(#lit)),
                None => quote!(::core::option::Option::None),
            };
            quote!(::nestrs::ComponentMetadata::controller(#type_name, #base_url))
        }
        Kind::Service => quote!(::nestrs::ComponentMetadata::service(#type_name)),
    };

    let field_metadata = fields.iter().map(|field| {
        let name = field.ident.to_string();
        let inject = field.inject.as_ref().map(|key| quote!(.inject(#key)));
        let route = field.route.as_ref().map(|descriptor| quote!(.route(#descriptor)));
        let http = field.http.as_ref().map(|method| quote!(.http(#method)));
        quote! {
            .field(::nestrs::FieldMetadata::new(#name) #inject #route #http)
        }
    });

    let slot_arms = fields.iter().filter(|field| field.inject.is_some()).map(|field| {
        let ident = &field.ident;
        let name = ident.to_string();
        quote! {
            #name => ::core::option::Option::Some(&self.#ident as &dyn ::nestrs::InjectSlot),
        }
    });

    let component_impl = quote! {
        impl #impl_generics ::nestrs::Component for #struct_name #ty_generics #where_clause {
            fn metadata(&self) -> ::nestrs::ComponentMetadata {
                #metadata_ctor
                    #(#field_metadata)*
            }

            fn injection_slot(
                &self,
                field: &str,
            ) -> ::core::option::Option<&dyn ::nestrs::InjectSlot> {
                match field {
                    #(#slot_arms)*
                    _ => ::core::option::Option::None,
                }
            }

            fn into_any(
                self: ::std::sync::Arc<Self>,
            ) -> ::std::sync::Arc<dyn ::std::any::Any + ::core::marker::Send + ::core::marker::Sync> {
                self
            }
        }
    };

    if kind == Kind::Service {
        return Ok(component_impl);
    }

    let handler_arms = fields
        .iter()
        .filter(|field| field.route.is_some() || field.http.is_some())
        .map(|field| {
            let ident = &field.ident;
            let name = ident.to_string();
            quote! {
                #name => {
                    let this = self;
                    let handler: ::nestrs::HandlerFn = ::std::sync::Arc::new(
                        move |ctx: &mut ::nestrs::Context| (this.#ident)(&*this, ctx),
                    );
                    ::core::option::Option::Some(handler)
                }
            }
        });

    Ok(quote! {
        #component_impl

        impl #impl_generics ::nestrs::Controller for #struct_name #ty_generics #where_clause {
            fn handler(
                self: ::std::sync::Arc<Self>,
                field: &str,
            ) -> ::core::option::Option<::nestrs::HandlerFn> {
                match field {
                    #(#handler_arms)*
                    _ => ::core::option::Option::None,
                }
            }
        }
    })
}

fn controller_args(attrs: &[Attribute]) -> syn::Result<Option<LitStr>> {
    let mut base_url = None;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("controller")) {
        let args: ControllerArgs = attr.parse_args()?;
        if args.base_url.is_some() {
            base_url = args.base_url;
        }
    }
    Ok(base_url)
}

fn collect_fields(input: &DeriveInput) -> syn::Result<Vec<FieldSpec>> {
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            Fields::Unit => return Ok(Vec::new()),
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "components must use named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "components can only be derived for structs",
            ));
        }
    };

    let mut specs = Vec::new();
    for field in fields {
        let Some(ident) = field.ident.clone() else {
            continue;
        };

        let mut spec = FieldSpec {
            ident,
            inject: None,
            route: None,
            http: None,
        };

        for attr in &field.attrs {
            if attr.path().is_ident("inject") {
                spec.inject = Some(inject_key(attr, &field.ty)?);
            } else if attr.path().is_ident("route") {
                spec.route = Some(attr.parse_args()?);
            } else if attr.path().is_ident("http") {
                spec.http = Some(attr.parse_args()?);
            }
        }

        specs.push(spec);
    }

    Ok(specs)
}

/// `#[inject("Key")]`, or bare `#[inject]` keyed by the `Injected<T>` type name
fn inject_key(attr: &Attribute, ty: &Type) -> syn::Result<LitStr> {
    match &attr.meta {
        Meta::Path(_) => {
            let inner = injected_inner_name(ty).ok_or_else(|| {
                syn::Error::new_spanned(
                    ty,
                    "cannot infer the injection key; use #[inject(\"Name\")] or an Injected<T> field",
                )
            })?;
            Ok(LitStr::new(&inner.to_string(), inner.span()))
        }
        _ => attr.parse_args(),
    }
}

/// Last path segment of `T` in `Injected<T>`
fn injected_inner_name(ty: &Type) -> Option<&Ident> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Injected" {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        syn::GenericArgument::Type(Type::Path(inner)) => {
            inner.path.segments.last().map(|segment| &segment.ident)
        }
        _ => None,
    }
}
