//! Collection members: sizes, key/value views, list and set mutation.

use crate::context::ConversionContext;
use crate::semantic::TypeCategory;
use crate::strategies::{
    SharedOperands, declaring_category, is_static_receiver, member_access, method_call,
    receiver_category,
};
use crate::syntax::{Expr, ExprKind};
use crate::traits::Strategy;

/// `xs.Count`, `s.Length`, `m.Keys`, `m.Values`.
pub struct CollectionProperties;

pub static COLLECTION_PROPERTIES: CollectionProperties = CollectionProperties;

/// `Add`, `AddRange`, `Insert`, `RemoveAt`, `Remove`, `Clear`.
pub struct CollectionMethods;

pub static COLLECTION_METHODS: CollectionMethods = CollectionMethods;

/// Whether a member the model resolves is declared by a collection or
/// string type. Unresolved members count as collection members, except on
/// the component itself.
fn collection_member(expr: &Expr, receiver: &Expr, ctx: &ConversionContext<'_>) -> bool {
    if matches!(receiver.kind, ExprKind::This | ExprKind::Base) {
        return false;
    }
    declaring_category(expr, ctx).is_none_or(|c| {
        c.is_sequence_like() || matches!(c, TypeCategory::Map | TypeCategory::String)
    })
}

impl Strategy<Expr> for CollectionProperties {
    fn name(&self) -> &'static str {
        "collection-properties"
    }

    fn matches(&self, expr: &Expr, ctx: &ConversionContext<'_>) -> bool {
        let Some((receiver, name)) = member_access(expr) else {
            return false;
        };
        if is_static_receiver(receiver, ctx) || !collection_member(expr, receiver, ctx) {
            return false;
        }
        match name {
            "Count" | "Length" => true,
            "Keys" | "Values" => ctx
                .semantic
                .category(receiver)
                .is_none_or(|c| c == TypeCategory::Map),
            _ => false,
        }
    }

    fn convert(&self, expr: &Expr, ctx: &mut ConversionContext<'_>) -> String {
        let Some((receiver, name)) = member_access(expr) else {
            return String::new();
        };
        let category = ctx.semantic.category(receiver);
        let target = ctx.operand(receiver);
        match (name, category) {
            ("Keys", _) => format!("Object.keys({target})"),
            ("Values", _) => format!("Object.values({target})"),
            (_, Some(TypeCategory::Map)) => format!("Object.keys({target}).length"),
            (_, Some(TypeCategory::Set)) => format!("{target}.size"),
            _ => format!("{target}.length"),
        }
    }
}

impl Strategy<Expr> for CollectionMethods {
    fn name(&self) -> &'static str {
        "collection-methods"
    }

    fn matches(&self, expr: &Expr, ctx: &ConversionContext<'_>) -> bool {
        let Some(call) = method_call(expr) else {
            return false;
        };
        let Some(receiver) = call.receiver else {
            return false;
        };
        if is_static_receiver(receiver, ctx) || !collection_member(expr, receiver, ctx) {
            return false;
        }
        let category = receiver_category(&call, expr, ctx);
        let list_like = category.is_none_or(|c| matches!(c, TypeCategory::List | TypeCategory::Sequence));
        match (call.name, call.arity()) {
            ("Add", 1) => list_like || category == Some(TypeCategory::Set),
            ("AddRange", 1) | ("Insert", 2) | ("RemoveAt", 1) => list_like,
            ("Clear", 0) => category != Some(TypeCategory::Set),
            // Unresolved `Remove` could be anything.
            ("Remove", 1) => matches!(category, Some(TypeCategory::List | TypeCategory::Set)),
            _ => false,
        }
    }

    fn convert(&self, expr: &Expr, ctx: &mut ConversionContext<'_>) -> String {
        let Some(call) = method_call(expr) else {
            return String::new();
        };
        let Some(receiver) = call.receiver else {
            return String::new();
        };
        let category = receiver_category(&call, expr, ctx);
        match (call.name, call.args, category) {
            ("Clear", [], Some(TypeCategory::Map)) => {
                let mut shared = SharedOperands::new();
                let target = shared.operand(receiver, ctx);
                let key = ctx.fresh_name("k");
                return shared.wrap(format!(
                    "Object.keys({target}).forEach(({key}) => delete {target}[{key}])"
                ));
            }
            ("Remove", [item], category) if category != Some(TypeCategory::Set) => {
                let mut shared = SharedOperands::new();
                let target = shared.operand(receiver, ctx);
                let text = ctx.expr(&item.expr);
                // Once the list is bound, the item must follow it in order.
                let item = if shared.is_empty() {
                    text
                } else {
                    shared.share(&item.expr, text, ctx)
                };
                let index = ctx.fresh_name("i");
                return shared.wrap(format!(
                    "(({index}) => {index} >= 0 && {target}.splice({index}, 1).length > 0)({target}.indexOf({item}))"
                ));
            }
            _ => {}
        }
        let target = ctx.operand(receiver);
        let args: Vec<String> = call.args.iter().map(|a| ctx.expr(&a.expr)).collect();
        match (call.name, args.as_slice(), category) {
            ("Add", [item], Some(TypeCategory::Set)) => format!("{target}.add({item})"),
            ("Add", [item], _) => format!("{target}.push({item})"),
            ("AddRange", [items], _) => format!("{target}.push(...{items})"),
            ("Insert", [index, item], _) => format!("{target}.splice({index}, 0, {item})"),
            ("RemoveAt", [index], _) => format!("{target}.splice({index}, 1)"),
            ("Clear", [], _) => format!("({target}.length = 0)"),
            ("Remove", [item], Some(TypeCategory::Set)) => format!("{target}.delete({item})"),
            _ => format!("{target}.{}({})", crate::writer::camel_case(call.name), args.join(", ")),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::convert::Converter;
    use crate::semantic::{EmptyModel, SemanticTable, SymbolInfo, SymbolKind, TypeInfo};
    use crate::syntax::{Expr, Span};

    fn convert(expr: &Expr) -> String {
        Converter::new()
            .convert_expression(expr, None, &EmptyModel)
            .text
    }

    fn typed_local(name: &str, ty: &str, start: u32) -> (SemanticTable, Expr) {
        let mut table = SemanticTable::new();
        let end = start + name.len() as u32;
        table.insert_symbol(
            Span::new(start, end),
            SymbolInfo {
                name: name.into(),
                kind: SymbolKind::Local,
                containing_type: None,
                ty: Some(TypeInfo::named(ty)),
            },
        );
        (table, Expr::ident(name).with_span(start, end))
    }

    #[test]
    fn test_sizes() {
        assert_eq!(convert(&Expr::member(Expr::ident("items"), "Count")), "items.length");
        assert_eq!(convert(&Expr::member(Expr::ident("name"), "Length")), "name.length");

        let (table, seen) = typed_local("seen", "System.Collections.Generic.HashSet`1", 0);
        let out = Converter::new().convert_expression(&Expr::member(seen, "Count"), None, &table);
        assert_eq!(out.text, "seen.size");

        let (table, index) = typed_local("index", "Dictionary", 0);
        let out = Converter::new().convert_expression(&Expr::member(index, "Count"), None, &table);
        assert_eq!(out.text, "Object.keys(index).length");
    }

    #[test]
    fn test_list_mutation() {
        let add = Expr::method_call(Expr::ident("items"), "Add", vec![Expr::ident("x")]);
        assert_eq!(convert(&add), "items.push(x)");
        let range = Expr::method_call(Expr::ident("items"), "AddRange", vec![Expr::ident("more")]);
        assert_eq!(convert(&range), "items.push(...more)");
        let insert = Expr::method_call(
            Expr::ident("items"),
            "Insert",
            vec![Expr::int(0), Expr::ident("x")],
        );
        assert_eq!(convert(&insert), "items.splice(0, 0, x)");
        let clear = Expr::method_call(Expr::ident("items"), "Clear", vec![]);
        assert_eq!(convert(&clear), "(items.length = 0)");
    }

    #[test]
    fn test_set_add() {
        let (table, seen) = typed_local("seen", "HashSet", 0);
        let add = Expr::method_call(seen, "Add", vec![Expr::ident("x")]);
        let out = Converter::new().convert_expression(&add, None, &table);
        assert_eq!(out.text, "seen.add(x)");
    }

    #[test]
    fn test_keys_view() {
        let keys = Expr::member(Expr::ident("_lookup"), "Keys");
        assert_eq!(convert(&keys), "Object.keys(this._lookup)");
    }

    #[test]
    fn test_computed_receiver_evaluates_once() {
        let mut table = SemanticTable::new();
        table.insert_type(Span::new(0, 8), TypeInfo::named("Dictionary"));
        let map = Expr::call(Expr::ident("lookup"), vec![]).with_span(0, 8);
        let clear = Expr::method_call(map, "Clear", vec![]);
        let out = Converter::new().convert_expression(&clear, None, &table);
        assert_eq!(
            out.text,
            "((__v0) => Object.keys(__v0).forEach((__k1) => delete __v0[__k1]))(lookup())"
        );

        let mut table = SemanticTable::new();
        table.insert_type(Span::new(0, 9), TypeInfo::named("List"));
        let list = Expr::call(Expr::ident("pending"), vec![]).with_span(0, 9);
        let remove = Expr::method_call(list, "Remove", vec![Expr::ident("x")]);
        let out = Converter::new().convert_expression(&remove, None, &table);
        assert_eq!(
            out.text,
            "((__v0) => ((__i1) => __i1 >= 0 && __v0.splice(__i1, 1).length > 0)(__v0.indexOf(x)))(pending())"
        );
    }
}
