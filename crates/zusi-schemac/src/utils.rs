use heck::{ToSnakeCase, ToUpperCamelCase};

/// Keywords that collide with generated field names. Derived-class attributes and
/// children are projected onto Rust identifiers via these two helpers, which mirror
/// the raw-identifier escaping every generated record field goes through.
pub fn escape_snake_case(name: &str) -> String {
    let name = name.to_snake_case();

    match name.as_str() {
        "if" | "else" | "ref" | "type" | "macro" | "loop" | "mod" | "override" | "for" | "in"
        | "box" | "final" | "break" | "move" | "match" | "fn" | "dyn" | "impl" | "trait"
        | "use" | "as" | "where" => {
            format!("r#{name}")
        }
        _ => name,
    }
}

pub fn escape_upper_camel_case(name: &str) -> String {
    let name = name.to_upper_camel_case();

    match name.as_str() {
        "Self" | "self" => format!("_{name}"),
        _ => name,
    }
}
