use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::token::Comma;
use syn::visit_mut::{self, VisitMut};
use syn::{
    AngleBracketedGenericArguments, Attribute, Error as SynError, FnArg, GenericArgument, Ident,
    ImplItem, ImplItemFn, ItemImpl, PatType, PathArguments, Result as SynResult, ReturnType,
    Signature, Type, TypePath,
};

const RETURN_TYPE_MESSAGE: &str = "a constructor's return type should be `Self` or `Result<Self, E>`";

#[derive(Debug)]
struct ConstructorData {
    identifier: Ident,
    arguments: Vec<ArgumentData>,
    return_type: ReturnTypeData,
}

#[derive(Debug)]
struct ArgumentData {
    span: Span,
    kind: ArgumentKind,
}

#[derive(Debug, PartialEq, Eq)]
enum ArgumentKind {
    Container,
    Positional,
}

#[derive(Debug)]
enum ReturnTypeData {
    Infallible,
    Result { error_type: Box<Type> },
}

fn is_helper_attribute(attr: &Attribute, name: &str) -> bool {
    attr.path().is_ident(name)
}

struct HelperAttributeRemoval;

impl VisitMut for HelperAttributeRemoval {
    fn visit_impl_item_fn_mut(&mut self, item: &mut ImplItemFn) {
        item.attrs
            .retain(|attr| !is_helper_attribute(attr, "constructor"));
        visit_mut::visit_impl_item_fn_mut(self, item);
    }

    fn visit_pat_type_mut(&mut self, arg: &mut PatType) {
        arg.attrs
            .retain(|attr| !is_helper_attribute(attr, "container"));
        visit_mut::visit_pat_type_mut(self, arg);
    }
}

pub fn expand_implementation(impls: TokenStream) -> SynResult<TokenStream2> {
    let mut impls = match syn::parse::<ItemImpl>(impls) {
        Ok(impls) => impls,
        Err(err) => {
            return Err(SynError::new(
                err.span(),
                "`#[deliverable]` should be annotated on the `impl` block",
            ))
        }
    };

    if let Some((_, path, _)) = &impls.trait_ {
        return Err(SynError::new_spanned(
            path,
            "`#[deliverable]` should be annotated on an inherent `impl` block",
        ));
    }

    let self_type = get_self_type(&impls)?;
    let signature = get_constructor_signature(&impls.items, &impls.self_ty)?;
    let ctor_data = parse_constructor(&self_type, signature)?;

    let expanded = expand_deliverable_implementation(&impls, ctor_data);

    HelperAttributeRemoval.visit_item_impl_mut(&mut impls);

    Ok(quote! {
        #impls
        #expanded
    })
}

fn get_self_type(impls: &ItemImpl) -> SynResult<TypePath> {
    if let Type::Path(ty) = impls.self_ty.as_ref() {
        Ok(ty.clone())
    } else {
        Err(SynError::new(impls.self_ty.span(), "invalid self type"))
    }
}

fn get_constructor_signature(items: &[ImplItem], self_ty: &Type) -> SynResult<Signature> {
    let ctors: Vec<_> = items
        .iter()
        .filter_map(filter_and_map_item_fn)
        .filter(|item_fn| is_annotated_with_constructor(item_fn))
        .collect();

    let signature = match ctors.as_slice() {
        [ctor] => ctor.sig.clone(),
        [] => {
            return Err(SynError::new_spanned(
                self_ty,
                "no associated function is annotated with `#[constructor]`",
            ))
        }
        [_, extra, ..] => {
            return Err(SynError::new_spanned(
                &extra.sig.ident,
                "only one associated function can be annotated with `#[constructor]`",
            ))
        }
    };

    if let Some(FnArg::Receiver(rec)) = signature.inputs.first() {
        return Err(SynError::new_spanned(
            rec,
            "method is not allowed to be annotated with `#[constructor]`",
        ));
    }

    Ok(signature)
}

fn filter_and_map_item_fn(item: &ImplItem) -> Option<&ImplItemFn> {
    if let ImplItem::Fn(impl_fn) = item {
        Some(impl_fn)
    } else {
        None
    }
}

fn is_annotated_with_constructor(item_fn: &ImplItemFn) -> bool {
    item_fn
        .attrs
        .iter()
        .any(|attr| is_helper_attribute(attr, "constructor"))
}

fn parse_constructor(self_type: &TypePath, signature: Signature) -> SynResult<ConstructorData> {
    let identifier = signature.ident;
    let arguments = parse_constructor_arguments(signature.inputs)?;
    let return_type = parse_constructor_return_type(signature.output, self_type)?;

    Ok(ConstructorData {
        identifier,
        arguments,
        return_type,
    })
}

fn parse_constructor_arguments(inputs: Punctuated<FnArg, Comma>) -> SynResult<Vec<ArgumentData>> {
    inputs
        .into_iter()
        .enumerate()
        .map(|(position, arg)| {
            let FnArg::Typed(arg) = arg else {
                unreachable!("a constructor should not have a receiver argument");
            };
            parse_argument_attributes(position, &arg).map(|kind| ArgumentData {
                span: arg.span(),
                kind,
            })
        })
        .collect()
}

fn parse_argument_attributes(position: usize, arg: &PatType) -> SynResult<ArgumentKind> {
    let mut kind = ArgumentKind::Positional;

    for attr in arg.attrs.iter() {
        if !is_helper_attribute(attr, "container") {
            continue;
        }
        attr.meta.require_path_only().map_err(|_| {
            SynError::new(attr.span(), "`#[container]` doesn't take any argument")
        })?;
        if position != 0 {
            return Err(SynError::new_spanned(
                attr,
                "only the first parameter of a constructor can be annotated with `#[container]`",
            ));
        }
        if kind == ArgumentKind::Container {
            return Err(SynError::new(
                attr.span(),
                "`#[container]` is annotated more than once",
            ));
        }
        kind = ArgumentKind::Container;
    }

    Ok(kind)
}

fn parse_constructor_return_type(
    output: ReturnType,
    self_type: &TypePath,
) -> SynResult<ReturnTypeData> {
    let ReturnType::Type(_, return_type) = output else {
        return Err(SynError::new(output.span(), RETURN_TYPE_MESSAGE));
    };
    let Type::Path(return_type) = *return_type else {
        return Err(SynError::new(return_type.span(), RETURN_TYPE_MESSAGE));
    };

    if is_self_type(&return_type, self_type) {
        return Ok(ReturnTypeData::Infallible);
    }

    let segments: Vec<_> = return_type.path.segments.iter().collect();
    let result_segment = match segments.as_slice() {
        [result] if result.ident == "Result" => result,
        [root, module, result]
            if (root.ident == "std" || root.ident == "core")
                && module.ident == "result"
                && result.ident == "Result" =>
        {
            result
        }
        _ => return Err(SynError::new_spanned(&return_type, RETURN_TYPE_MESSAGE)),
    };

    parse_result_return_type(&result_segment.arguments, self_type)
}

fn is_self_type(ty: &TypePath, self_type: &TypePath) -> bool {
    ty == self_type || (ty.qself.is_none() && ty.path.is_ident("Self"))
}

fn parse_result_return_type(
    type_args: &PathArguments,
    self_type: &TypePath,
) -> SynResult<ReturnTypeData> {
    let PathArguments::AngleBracketed(AngleBracketedGenericArguments {
        args: type_args, ..
    }) = type_args
    else {
        return Err(SynError::new(type_args.span(), RETURN_TYPE_MESSAGE));
    };

    let args: Vec<_> = type_args.iter().collect();
    match args.as_slice() {
        [GenericArgument::Type(Type::Path(ok_type)), GenericArgument::Type(error_type)]
            if is_self_type(ok_type, self_type) =>
        {
            Ok(ReturnTypeData::Result {
                error_type: Box::new(error_type.clone()),
            })
        }
        _ => Err(SynError::new(type_args.span(), RETURN_TYPE_MESSAGE)),
    }
}

fn expand_deliverable_implementation(impls: &ItemImpl, ctor_data: ConstructorData) -> TokenStream2 {
    let self_type = &impls.self_ty;
    let (impl_generics, _, where_clause) = impls.generics.split_for_impl();
    let constructor = &ctor_data.identifier;

    let needs_container = ctor_data
        .arguments
        .first()
        .is_some_and(|arg| arg.kind == ArgumentKind::Container);
    let const_location = if needs_container {
        quote! {
            const LOCATION: courier::delivery::DeliveryLocation =
                courier::delivery::DeliveryLocation::NeedsContainer;
        }
    } else {
        quote! {}
    };

    let associated_type_error =
        if let ReturnTypeData::Result { error_type } = &ctor_data.return_type {
            quote! { type Error = #error_type; }
        } else {
            quote! { type Error = std::convert::Infallible; }
        };

    let gather_statements = ctor_data
        .arguments
        .iter()
        .enumerate()
        .map(|(i, arg)| {
            let ident = Ident::new(&format!("arg{i}"), arg.span);
            match arg.kind {
                ArgumentKind::Container => quote! { let #ident = arguments.container()?; },
                ArgumentKind::Positional => quote! { let #ident = arguments.next()?; },
            }
        })
        .collect::<TokenStream2>();

    let call_args = ctor_data
        .arguments
        .iter()
        .enumerate()
        .map(|(i, arg)| {
            let ident = Ident::new(&format!("arg{i}"), arg.span);
            quote! { #ident, }
        })
        .collect::<TokenStream2>();

    let construct_body = if let ReturnTypeData::Infallible = &ctor_data.return_type {
        quote! { Ok(Ok(<#self_type>::#constructor(#call_args))) }
    } else {
        quote! { Ok(<#self_type>::#constructor(#call_args)) }
    };

    quote! {
        impl #impl_generics courier::delivery::Deliverable for #self_type #where_clause {
            #const_location
            #associated_type_error

            fn construct(
                arguments: &mut courier::argument::Arguments,
            ) -> std::result::Result<
                std::result::Result<Self, Self::Error>,
                courier::argument::ArgumentError
            > {
                #gather_statements
                #construct_body
            }
        }
    }
}
