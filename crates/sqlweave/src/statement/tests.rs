//! Tests for the statement builders (model state only; SQL output is covered
//! by the compiler tests).

use crate::statement::{
    Bind, Concat, DataTuple, Direction, Find, JoinKind, Remove, Save, SqlStatement, Statement,
    StatementKind,
};
use crate::value::Value;

#[test]
fn test_find_collects_sources_and_fields() {
    let find = Find::new()
        .in_("users u")
        .in_(["posts", "tags t"])
        .get("name n")
        .get(["id", "email"]);

    let sources: Vec<_> = find.sources().iter().map(|s| (s.name(), s.alias())).collect();
    assert_eq!(
        sources,
        vec![("users", Some("u")), ("posts", None), ("tags", Some("t"))]
    );
    let fields: Vec<_> = find.fields().iter().map(|f| f.name()).collect();
    assert_eq!(fields, vec!["name", "id", "email"]);
    assert!(find.error().is_none());
}

#[test]
fn test_repeated_fields_are_selected_once() {
    let find = Find::new().get(["a", "b"]).get(["b", "c"]).get("a x");
    let fields: Vec<_> = find.fields().iter().map(|f| (f.name(), f.alias())).collect();
    assert_eq!(
        fields,
        vec![("a", None), ("b", None), ("c", None), ("a", Some("x"))]
    );
}

#[test]
fn test_zero_limit_clears_limit() {
    assert!(Find::new().limit(0).limit_value().is_none());
    assert!(Find::new().limit(5).limit_offset(0, 10).limit_value().is_none());
    assert!(Find::new().page(0, 3).limit_value().is_none());
}

#[test]
fn test_malformed_source_is_recorded() {
    let find = Find::new().in_("users u extra").where_("a", 1);
    assert!(find.error().unwrap().is_malformed());
    // building continues after the error
    assert_eq!(find.wheres().len(), 1);
}

#[test]
fn test_first_error_is_sticky() {
    let find = Find::new().close().where_("a b c d", 1);
    assert!(find.error().unwrap().is_structural());
}

#[test]
fn test_where_concat_and_brackets() {
    let find = Find::new()
        .where_("a", 1)
        .open()
        .and_where("b", ())
        .open()
        .or_where("c", ())
        .and_where("d", ())
        .close_n(2);

    let parts = find.wheres();
    assert_eq!(parts.len(), 4);
    assert_eq!(parts[0].concat(), Concat::And);
    assert_eq!(parts[1].open_brackets(), 1);
    assert_eq!(parts[2].concat(), Concat::Or);
    assert_eq!(parts[2].open_brackets(), 1);
    assert_eq!(parts[3].close_brackets(), 2);
    assert!(parts[1].bind().is_null());
}

#[test]
fn test_where_map_uses_and_in_order() {
    let find = Find::new().where_map(vec![("a", 1), ("b >", 2)]);
    let parts = find.wheres();
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[1].clause().operator(), ">");
    assert!(parts.iter().all(|p| p.concat() == Concat::And));
}

#[test]
fn test_join_mode_routes_where_to_on_list() {
    let find = Find::new()
        .in_("users u")
        .where_("u.active", true)
        .left_join("posts p")
        .where_("p.user_id = u.id", ())
        .or_on("p.public", true);

    assert!(find.in_join_mode());
    assert_eq!(find.wheres().len(), 1);
    let join = &find.joins()[0];
    assert_eq!(join.kind(), JoinKind::Left);
    assert_eq!(join.source().alias(), Some("p"));
    assert_eq!(join.conditions().len(), 2);
    assert_eq!(join.conditions()[1].concat(), Concat::Or);
}

#[test]
fn test_on_without_join_is_structural() {
    let find = Find::new().on("a = b", ());
    assert!(find.error().unwrap().is_structural());
}

#[test]
fn test_sort_overwrites_direction_and_keeps_order() {
    let find = Find::new()
        .sort("a", "desc")
        .sort_asc("b")
        .sort("a", "ASC");
    assert_eq!(
        find.sorts(),
        &[("a".to_string(), Direction::Asc), ("b".to_string(), Direction::Asc)]
    );
}

#[test]
fn test_group_accepts_string_and_list() {
    let find = Find::new().group("a, b ,").group(["c"]);
    assert_eq!(find.groups(), &["a", "b", "c"]);
}

#[test]
fn test_page_translates_to_limit_offset() {
    let find = Find::new().page(10, 3);
    let limit = find.limit_value().unwrap();
    assert_eq!((limit.limit, limit.offset), (10, 20));

    let first = Find::new().page(10, 0).limit_value().unwrap();
    assert_eq!(first.offset, 0);
}

#[test]
fn test_sub_find_is_bound_as_query() {
    let sub = Find::new().in_("test").where_("subId >", 1);
    let find = Find::new().where_("id !*", sub.clone());
    assert_eq!(find.wheres()[0].bind(), &Bind::Query(Box::new(sub)));
}

#[test]
fn test_list_bind() {
    let find = Find::new().where_("id *", vec![1, 2, 3]);
    assert_eq!(
        find.wheres()[0].bind(),
        &Bind::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
    );
}

#[test]
fn test_data_tuple_keeps_order_and_nulls() {
    let tuple = DataTuple::new()
        .set("b", 1)
        .set("a", Option::<i32>::None)
        .set("b", 2);
    let fields: Vec<_> = tuple.fields().collect();
    assert_eq!(fields, vec!["b", "a"]);
    assert_eq!(tuple.get("b"), Some(&Value::Int(2)));
    assert_eq!(tuple.get("a"), Some(&Value::Null));
}

#[test]
fn test_data_tuple_same_fields_ignores_order() {
    let a = DataTuple::from([("x", 1), ("y", 2)]);
    let b = DataTuple::from([("y", 3), ("x", 4)]);
    let c = DataTuple::from([("x", 1), ("z", 2)]);
    assert!(a.same_fields(&b));
    assert!(!a.same_fields(&c));
}

#[test]
fn test_save_update_rejects_second_tuple() {
    let save = Save::new()
        .in_("t")
        .where_("id", 1)
        .data([("a", 1)])
        .data([("a", 2)]);
    assert!(save.is_update());
    assert!(save.error().unwrap().is_unsupported());
}

#[test]
fn test_save_data_json() {
    let save = Save::new()
        .in_("t")
        .data_json(serde_json::json!([{"a": 1}, {"a": 2}]));
    assert_eq!(save.data_tuples().len(), 2);
    assert!(save.error().is_none());

    let bad = Save::new().data_json(serde_json::json!(3));
    assert!(bad.error().unwrap().is_malformed());
}

#[test]
fn test_remove_allow_all_flag() {
    assert!(!Remove::new().allows_all());
    assert!(Remove::new().allow_all().allows_all());
}

#[test]
fn test_statement_kind_from_str() {
    assert_eq!("find".parse::<StatementKind>().unwrap(), StatementKind::Find);
    assert_eq!("Save".parse::<StatementKind>().unwrap(), StatementKind::Save);
    assert_eq!(StatementKind::Remove.to_string(), "remove");
    assert!("select".parse::<StatementKind>().unwrap_err().is_unknown_operation());
}

#[test]
fn test_statement_new_and_ref() {
    let stmt = Statement::new(StatementKind::Remove);
    assert_eq!(stmt.kind(), StatementKind::Remove);

    let find = Find::new().close();
    let view = find.as_statement();
    assert_eq!(view.kind(), StatementKind::Find);
    assert!(view.error().is_some());
}
