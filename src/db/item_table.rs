// ItemTable queries
// VS Code keeps its global state as `ItemTable(key TEXT, value BLOB)`.

use rusqlite::{params, Connection};

use crate::constants::{ITEM_KEY_COLUMN, ITEM_TABLE, LIKE_ESCAPE_CHAR};
use crate::error::Result;

/// `%keyword%` with LIKE wildcards in the keyword escaped, so the match is a
/// plain (ASCII case-insensitive) substring test.
pub fn like_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for c in keyword.chars() {
        if c == '%' || c == '_' || c == LIKE_ESCAPE_CHAR {
            pattern.push(LIKE_ESCAPE_CHAR);
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

pub fn find_matching_keys(conn: &Connection, pattern: &str) -> Result<Vec<String>> {
    let sql = format!(
        "SELECT {col} FROM {table} WHERE {col} LIKE ?1 ESCAPE '{esc}' ORDER BY rowid",
        col = ITEM_KEY_COLUMN,
        table = ITEM_TABLE,
        esc = LIKE_ESCAPE_CHAR,
    );
    let mut stmt = conn.prepare(&sql)?;

    let keys = stmt
        .query_map(params![pattern], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(keys)
}

/// Delete every matching row. Returns the engine's affected-row count.
pub fn delete_matching(conn: &Connection, pattern: &str) -> Result<usize> {
    let sql = format!(
        "DELETE FROM {table} WHERE {col} LIKE ?1 ESCAPE '{esc}'",
        col = ITEM_KEY_COLUMN,
        table = ITEM_TABLE,
        esc = LIKE_ESCAPE_CHAR,
    );
    let deleted = conn.execute(&sql, params![pattern])?;
    Ok(deleted)
}

pub fn count_rows(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {}", ITEM_TABLE),
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(keys: &[&str]) -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE ItemTable (key TEXT UNIQUE ON CONFLICT REPLACE, value BLOB);")
            .unwrap();
        for key in keys {
            conn.execute("INSERT INTO ItemTable (key, value) VALUES (?1, x'00')", params![key])
                .unwrap();
        }
        conn
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("augment"), "%augment%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let conn = setup(&["Augment.Chat", "AUGMENT", "other"]);
        let keys = find_matching_keys(&conn, &like_pattern("augment")).unwrap();
        assert_eq!(keys, vec!["Augment.Chat", "AUGMENT"]);
    }

    #[test]
    fn test_wildcards_in_keyword_are_literal() {
        let conn = setup(&["a_b", "axb", "100%", "1000"]);
        assert_eq!(find_matching_keys(&conn, &like_pattern("a_b")).unwrap(), vec!["a_b"]);
        assert_eq!(find_matching_keys(&conn, &like_pattern("0%")).unwrap(), vec!["100%"]);
    }

    #[test]
    fn test_delete_matching_counts() {
        let conn = setup(&["x.augment", "y", "augment.z"]);
        assert_eq!(delete_matching(&conn, &like_pattern("augment")).unwrap(), 2);
        assert_eq!(count_rows(&conn).unwrap(), 1);
        assert_eq!(delete_matching(&conn, &like_pattern("augment")).unwrap(), 0);
    }
}
