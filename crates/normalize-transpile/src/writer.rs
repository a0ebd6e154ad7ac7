//! Helpers for producing JavaScript source text.
//!
//! Everything here is string-level: quoting, identifier casing and
//! block layout. Conversion code builds output by composing these.

/// Quote `s` as a double-quoted JavaScript string literal.
pub fn quote(s: &str) -> String {
    format!("\"{}\"", escape_string(s))
}

pub fn escape_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
        .replace('\0', "\\0")
}

/// Escape literal text for use inside a template literal.
pub fn escape_template(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('`', "\\`")
        .replace("${", "\\${")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

pub fn is_valid_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_alphabetic() && first != '_' && first != '$' {
        return false;
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// Object literal key: bare when it is an identifier, quoted otherwise.
pub fn object_key(key: &str) -> String {
    if is_valid_identifier(key) {
        key.to_string()
    } else {
        quote(key)
    }
}

/// Convert a member name to the target's camelCase convention.
///
/// `DisplayName` → `displayName`, `ID` → `id`, `HTMLParser` → `htmlParser`.
/// Leading underscores are preserved.
pub fn camel_case(name: &str) -> String {
    let trimmed = name.trim_start_matches('_');
    let prefix = &name[..name.len() - trimmed.len()];
    let chars: Vec<char> = trimmed.chars().collect();
    if chars.is_empty() || !chars[0].is_uppercase() {
        return name.to_string();
    }

    // Length of the leading run of uppercase letters.
    let run = chars.iter().take_while(|c| c.is_uppercase()).count();
    let lower_until = if run == chars.len() {
        run
    } else if run > 1 {
        // Keep the last capital of an acronym: it starts the next word.
        run - 1
    } else {
        1
    };

    let mut out = String::with_capacity(name.len());
    out.push_str(prefix);
    for (i, c) in chars.iter().enumerate() {
        if i < lower_until {
            out.extend(c.to_lowercase());
        } else {
            out.push(*c);
        }
    }
    out
}

/// Indent every non-empty line of `text` by `indent`.
pub fn indent_lines(text: &str, indent: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{indent}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Wrap already-converted statements in braces, one per line.
pub fn block(statements: &[String], indent: &str) -> String {
    let body: Vec<&str> = statements
        .iter()
        .map(String::as_str)
        .filter(|s| !s.is_empty())
        .collect();
    if body.is_empty() {
        return "{}".to_string();
    }
    format!("{{\n{}\n}}", indent_lines(&body.join("\n"), indent))
}

pub fn comma_list(items: &[String]) -> String {
    items.join(", ")
}

/// True when `text` can be used as a call receiver or operand without
/// parentheses: identifiers, member chains, calls, index expressions and
/// literals. Anything with a top-level operator or space is not simple.
pub fn is_simple_operand(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }
    let mut depth = 0usize;
    let mut in_string: Option<char> = None;
    let mut escaped = false;
    for c in text.chars() {
        if let Some(q) = in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                in_string = None;
            }
            continue;
        }
        match c {
            '"' | '\'' | '`' => in_string = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            _ if depth > 0 => {}
            c if c.is_alphanumeric() || matches!(c, '_' | '$' | '.' | '?') => {}
            _ => return false,
        }
    }
    true
}

/// Parenthesize `text` unless it is already a simple operand.
pub fn operand(text: &str) -> String {
    if is_simple_operand(text) {
        text.to_string()
    } else {
        format!("({text})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("DisplayName"), "displayName");
        assert_eq!(camel_case("ID"), "id");
        assert_eq!(camel_case("HTMLParser"), "htmlParser");
        assert_eq!(camel_case("count"), "count");
        assert_eq!(camel_case("_Count"), "_count");
        assert_eq!(camel_case("_count"), "_count");
        assert_eq!(camel_case("X"), "x");
    }

    #[test]
    fn test_escape_string() {
        assert_eq!(quote("a\"b\n"), "\"a\\\"b\\n\"");
        assert_eq!(escape_template("`${x}`"), "\\`\\${x}\\`");
    }

    #[test]
    fn test_block_layout() {
        let out = block(&["a();".into(), "if (x) {\n  b();\n}".into()], "  ");
        assert_eq!(out, "{\n  a();\n  if (x) {\n    b();\n  }\n}");
        assert_eq!(block(&[], "  "), "{}");
    }

    #[test]
    fn test_operand() {
        assert_eq!(operand("this.items"), "this.items");
        assert_eq!(operand("a + b"), "(a + b)");
        assert_eq!(operand("(a + b)"), "(a + b)");
        assert_eq!(operand("(a) + (b)"), "((a) + (b))");
        assert_eq!(operand("f(x).y[0]"), "f(x).y[0]");
        assert_eq!(operand("-1"), "(-1)");
    }
}
