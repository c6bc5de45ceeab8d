//! Build the same statements for every built-in dialect and print the result.
//!
//! Run with: `cargo run -p sqlweave --example builder`

use sqlweave::{Compiler, Dialect, Find, Remove, Save, SqlStatement};

fn show(label: &str, compiler: &Compiler, stmt: &impl SqlStatement) {
    match compiler.build(stmt) {
        Ok(built) => println!("  {label:<8} {}\n  {:<8} {:?}", built.sql, "", built.params),
        Err(err) => println!("  {label:<8} error: {err}"),
    }
}

fn main() {
    let recent = Find::new()
        .in_("posts p")
        .get(["p.id", "p.title", "u.name author"])
        .where_("p.published", true)
        .open()
        .and_where("p.title ~ *?*", "rust")
        .or_where("p.tag *", vec!["rust", "sql"])
        .close()
        .left_join("users u")
        .on("u.id = p.user_id", ())
        .sort_desc("p.created_at")
        .page(20, 2);

    let archived = Find::new()
        .in_("posts")
        .get("id")
        .where_("archived", true);

    let cleanup = Remove::new()
        .in_("comments")
        .where_("post_id *", archived)
        .and_where("deleted_at !=", ());

    let insert = Save::new()
        .in_("tags")
        .data_json(serde_json::json!([{ "name": "rust" }, { "name": "sql" }]));

    let update = Save::new()
        .in_("posts")
        .data([("title", "Hello again")])
        .where_("id", 7);

    let broken = Find::new().in_("posts").close();

    for dialect in [Dialect::Sql, Dialect::Mysql, Dialect::Pgsql] {
        let compiler = Compiler::new(dialect);
        println!("{dialect}:");
        show("select", &compiler, &recent);
        show("delete", &compiler, &cleanup);
        show("insert", &compiler, &insert);
        show("update", &compiler, &update);
        show("broken", &compiler, &broken);
    }
}
