use pg2sybase::prelude::*;
use pretty_assertions::assert_eq;

#[test]
fn test_literals_survive_every_rule() {
    let sql = "SELECT a || 'SELECT TRUE || NOW()' FROM t WHERE b = 'it''s' AND c = 'LIMIT 5 OFFSET 1'";
    let out = translate(sql).unwrap();
    assert!(out.contains("'SELECT TRUE || NOW()'"));
    assert!(out.contains("'it''s'"));
    assert!(out.contains("'LIMIT 5 OFFSET 1'"));
    assert!(out.starts_with("SELECT a + "));
}

#[test]
fn test_target_syntax_is_unchanged() {
    let sql = "SELECT TOP 10 [id], name FROM users WHERE active = 1 ORDER BY name";
    assert_eq!(translate(sql).unwrap(), sql);
}

#[test]
fn test_boolean_substitution() {
    assert!(translate("SELECT * FROM t WHERE active = TRUE").unwrap().contains("= 1"));
    let out = translate("SELECT * FROM users WHERE active = true AND deleted = False").unwrap();
    assert_eq!(out, "SELECT * FROM users WHERE active = 1 AND deleted = 0");
    let out = translate("SELECT * FROM t WHERE name = 'TRUE'").unwrap();
    assert_eq!(out, "SELECT * FROM t WHERE name = 'TRUE'");
}

#[test]
fn test_concatenation() {
    let out = translate("SELECT first_name || ' ' || last_name AS full_name FROM users").unwrap();
    assert!(out.contains("first_name + ' ' + last_name"));
    assert!(!out.contains("||"));

    let out = translate("SELECT name FROM users WHERE description = 'test||value'").unwrap();
    assert!(out.contains("'test||value'"));
}

#[test]
fn test_simple_pagination() {
    let out = translate("SELECT * FROM users WHERE active = TRUE LIMIT 10").unwrap();
    assert_eq!(out, "SELECT TOP 10 * FROM users WHERE active = 1");
}

#[test]
fn test_offset_pagination_collapses_columns() {
    let out = translate("SELECT id, name FROM t ORDER BY id DESC LIMIT 5 OFFSET 1").unwrap();
    assert_eq!(out, "SELECT TOP 5 START AT 2 * FROM t ORDER BY id DESC");
}

#[test]
fn test_offset_pagination_without_collapse() {
    let options = Config::builder()
        .collapse_offset_projection(false)
        .build()
        .translate_options();
    let out = translate_with("SELECT * FROM users LIMIT 10 OFFSET 20", options).unwrap();
    assert_eq!(out, "SELECT TOP 10 START AT 21 * FROM users");
    let out = translate_with("SELECT id FROM users LIMIT 10 OFFSET 20", options).unwrap();
    assert_eq!(out, "SELECT TOP 10 START AT 21 id FROM users");
}

#[test]
fn test_fetch_first() {
    let out = translate("SELECT id FROM t ORDER BY id FETCH FIRST 3 ROWS ONLY").unwrap();
    assert_eq!(out, "SELECT TOP 3 id FROM t ORDER BY id");
}

#[test]
fn test_ddl_types() {
    let out = translate("CREATE TABLE t (id SERIAL)").unwrap();
    assert!(out.contains("NUMERIC(10,0) IDENTITY"));

    let out = translate(
        "CREATE TABLE posts (\n  id BIGSERIAL PRIMARY KEY,\n  \"body\" TEXT NOT NULL,\n  textual_field INT,\n  published BOOLEAN DEFAULT FALSE,\n  raw BYTEA,\n  created_at TIMESTAMP WITH TIME ZONE DEFAULT CURRENT_TIMESTAMP\n)",
    )
    .unwrap();
    assert_eq!(
        out,
        "CREATE TABLE posts (\n  id NUMERIC(19,0) IDENTITY PRIMARY KEY,\n  [body] VARCHAR(MAX) NOT NULL,\n  textual_field INT,\n  published BIT DEFAULT 0,\n  raw IMAGE,\n  created_at DATETIME DEFAULT GETDATE()\n)"
    );
}

#[test]
fn test_functions() {
    let out = translate("SELECT NOW(), LENGTH(name), SUBSTR(name, 1, 3), RANDOM() FROM users").unwrap();
    assert_eq!(out, "SELECT GETDATE(), LEN(name), SUBSTRING(name, 1, 3), RAND() FROM users");
}

#[test]
fn test_ilike() {
    let out = translate("SELECT * FROM users WHERE name ILIKE 'john%'").unwrap();
    assert_eq!(out, "SELECT * FROM users WHERE UPPER(name) LIKE UPPER('john%')");
}

#[test]
fn test_ilike_with_concatenated_pattern_is_left_alone() {
    let out = translate("SELECT * FROM users WHERE name ILIKE '%' || term || '%'").unwrap();
    assert_eq!(out, "SELECT * FROM users WHERE name ILIKE '%' + term + '%'");
    assert!(!out.contains("UPPER"));

    let out = translate("SELECT * FROM users WHERE first_name || last_name ILIKE 'x%'").unwrap();
    assert_eq!(out, "SELECT * FROM users WHERE first_name + last_name ILIKE 'x%'");
}

#[test]
fn test_returning_with_multiline_literal_and_comment() {
    let out = translate("UPDATE t SET a = TRUE RETURNING id, 'a\nb' AS tag /* x\ny */, name").unwrap();
    assert_eq!(out.lines().count(), 1);
    assert!(out.starts_with("UPDATE t SET a = 1 -- RETURNING id, 'a b' AS tag /* x y */, name ("));

    let out = translate("DELETE FROM t RETURNING id /* done\n */;\nSELECT 1").unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "DELETE FROM t /* done");
    assert!(lines[1].starts_with(" */; -- RETURNING id ("));
    assert_eq!(lines[2], "SELECT 1");
}

#[test]
fn test_type_rule_respects_word_boundaries() {
    let sql = "SELECT address text FROM t";
    assert_eq!(translate(sql).unwrap(), sql);
}

#[test]
fn test_returning() {
    let out = translate("INSERT INTO users (name) VALUES ('John') RETURNING id").unwrap();
    assert!(out.starts_with("INSERT INTO users (name) VALUES ('John') -- RETURNING id ("));
    assert!(!out.contains('\n'));
}

#[test]
fn test_malformed_literal() {
    let err = translate("SELECT * FROM users WHERE name = 'O'Brien'").unwrap_err();
    match err {
        TranslateError::MalformedLiteral { line, column, .. } => {
            assert_eq!((line, column), (1, 42));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_comments_are_preserved() {
    let sql = "SELECT a -- keep TRUE and don't touch\nFROM t WHERE b = TRUE /* LIMIT 1 */";
    assert_eq!(
        translate(sql).unwrap(),
        "SELECT a -- keep TRUE and don't touch\nFROM t WHERE b = 1 /* LIMIT 1 */"
    );
}

#[test]
fn test_script_with_several_statements() {
    let sql = "SELECT a FROM t LIMIT 1;\nINSERT INTO t (a) VALUES (TRUE) RETURNING a;\nSELECT b, c FROM u LIMIT 2 OFFSET 3;";
    let out = translate(sql).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "SELECT TOP 1 a FROM t;");
    assert!(lines[1].starts_with("INSERT INTO t (a) VALUES (1); -- RETURNING a ("));
    assert_eq!(lines[2], "SELECT TOP 2 START AT 4 * FROM u;");
}

#[test]
fn test_complex_query() {
    let sql = r#"
        SELECT "user_id", first_name || ' ' || last_name AS full_name, NOW()
        FROM "users"
        WHERE active = TRUE AND email ILIKE '%@example.com'
        LIMIT 5 OFFSET 10
        "#;
    let out = translate(sql).unwrap();
    assert!(out.contains("SELECT TOP 5 START AT 11 * "));
    assert!(out.contains("FROM [users]"));
    assert!(out.contains("active = 1"));
    assert!(out.contains("UPPER(email) LIKE UPPER('%@example.com')"));
    assert!(!out.contains("LIMIT"));
}

#[test]
fn test_concurrent_translation() {
    let handles: Vec<_> = (0..8)
        .map(|i| {
            std::thread::spawn(move || {
                translate(&format!("SELECT * FROM t{i} WHERE a = TRUE LIMIT {i}")).unwrap()
            })
        })
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(
            handle.join().unwrap(),
            format!("SELECT TOP {i} * FROM t{i} WHERE a = 1")
        );
    }
}
