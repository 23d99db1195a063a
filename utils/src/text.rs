/// LIKE/ILIKEの部分一致パターンを返す。
///
/// `%`、`_`及び`\`はエスケープされるため、入力値はリテラルとして扱われる。
/// エスケープ文字は`\`（PostgreSQLのデフォルト）である。
pub fn contains_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
