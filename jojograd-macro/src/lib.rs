use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::{
    parse::{Parse, ParseStream},
    parse_macro_input,
    spanned::Spanned,
    BinOp, Block, Expr, ExprLit, Ident, Pat, Stmt, Token, UnOp,
};

struct MacroInput {
    tape: Expr,
    block: Block,
}

impl Parse for MacroInput {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let tape = input.parse()?;
        input.parse::<Token![,]>()?;
        let block = input.parse()?;
        Ok(Self { tape, block })
    }
}

/// Records the `let` statements of a block onto a tape.
///
/// ```ignore
/// let tape = jojograd::Tape::new();
/// jojograd!(tape, {
///     let x = 123.;
///     let y = 2. * x + 321.;
/// });
/// y.backward(1.)?;
/// ```
///
/// A literal becomes a leaf named after its variable and arithmetic becomes
/// operations on the tape. Other statements, such as method calls or compound
/// assignments, are emitted unchanged.
#[proc_macro]
pub fn jojograd(input: TokenStream) -> TokenStream {
    let MacroInput { tape, block } = parse_macro_input!(input as MacroInput);
    let tape = quote! { #tape };

    let mut objs = vec![];

    for stmt in &block.stmts {
        traverse_stmt(stmt, &tape, &mut objs);
    }

    let expanded = quote! {
        #(#objs)*
    };

    TokenStream::from(expanded)
}

fn traverse_stmt(input: &Stmt, tape: &TokenStream2, terms: &mut Vec<TokenStream2>) {
    match input {
        Stmt::Local(local) => {
            if let (Pat::Ident(id), Some(init)) = (&local.pat as &Pat, &local.init) {
                let name = id.ident.clone();
                let ex = &init.expr;
                let ts = if let Some(lit) = literal(ex) {
                    quote! {
                        let #name = #tape.term(stringify!(#name), #lit);
                    }
                } else if let Expr::Path(path) = ex as &Expr {
                    quote! {
                        let #name = #path;
                    }
                } else if let Some(res) = traverse_expr(ex, tape, terms) {
                    quote! {
                        let #name = #res;
                    }
                } else {
                    quote! {
                        let #name = #ex;
                    }
                };
                terms.push(ts);
            } else {
                terms.push(quote! { #input });
            }
        }
        Stmt::Expr(ex, _) => {
            if traverse_expr(ex, tape, terms).is_none() {
                terms.push(quote! { #input });
            }
        }
        _ => terms.push(quote! { #input }),
    }
}

fn var_name(terms: &[TokenStream2]) -> String {
    format!("_a{}", terms.len())
}

/// A literal, possibly negated, which becomes the value of a leaf.
fn literal(ex: &Expr) -> Option<TokenStream2> {
    match ex {
        Expr::Lit(ExprLit { lit, .. }) => Some(quote! { #lit }),
        Expr::Unary(un) if matches!(un.op, UnOp::Neg(_)) => {
            literal(&un.expr).map(|lit| quote! { -#lit })
        }
        Expr::Paren(ex) => literal(&ex.expr),
        _ => None,
    }
}

fn format_term(
    lit: TokenStream2,
    span: Span,
    tape: &TokenStream2,
    terms: &mut Vec<TokenStream2>,
) -> Ident {
    let name = Ident::new(&var_name(terms), span);
    let ts = quote! {
        let #name = #tape.term(stringify!(#name), #lit);
    };
    terms.push(ts);
    name
}

fn traverse_expr(
    input: &Expr,
    tape: &TokenStream2,
    terms: &mut Vec<TokenStream2>,
) -> Option<Ident> {
    if let Some(lit) = literal(input) {
        return Some(format_term(lit, input.span(), tape, terms));
    }
    match input {
        Expr::Binary(ex) => {
            let op = match ex.op {
                BinOp::Add(_) => quote! { + },
                BinOp::Sub(_) => quote! { - },
                BinOp::Mul(_) => quote! { * },
                BinOp::Div(_) => quote! { / },
                _ => return None,
            };
            let lhs = traverse_expr(&ex.left, tape, terms);
            let rhs = traverse_expr(&ex.right, tape, terms);
            if let (Some(lhs), Some(rhs)) = (lhs, rhs) {
                let name = Ident::new(&var_name(terms), ex.span());
                let ts = quote! {
                    let #name = #lhs #op #rhs;
                };
                terms.push(ts);
                Some(name)
            } else {
                None
            }
        }
        Expr::Unary(ex) if matches!(ex.op, UnOp::Neg(_)) => {
            let term = traverse_expr(&ex.expr, tape, terms)?;
            let name = Ident::new(&var_name(terms), ex.span());
            terms.push(quote! {
                let #name = -#term;
            });
            Some(name)
        }
        Expr::Paren(ex) => traverse_expr(&ex.expr, tape, terms),
        Expr::Path(path) => path.path.get_ident().cloned(),
        _ => None,
    }
}
