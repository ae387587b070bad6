use std::fmt;

use heck::{ToLowerCamelCase, ToPascalCase, ToSnakeCase};

use crate::error::GeneratorError;

/// Kotlin hard, soft and modifier keywords that need backtick escaping.
pub const KOTLIN_RESERVED_WORDS: &[&str] = &[
    "abstract",
    "annotation",
    "as",
    "break",
    "case",
    "catch",
    "class",
    "companion",
    "const",
    "constructor",
    "continue",
    "crossinline",
    "data",
    "delegate",
    "do",
    "else",
    "enum",
    "external",
    "false",
    "final",
    "finally",
    "for",
    "fun",
    "if",
    "in",
    "infix",
    "init",
    "inline",
    "inner",
    "interface",
    "internal",
    "is",
    "it",
    "lateinit",
    "lazy",
    "noinline",
    "null",
    "object",
    "open",
    "operator",
    "out",
    "override",
    "package",
    "private",
    "protected",
    "public",
    "reified",
    "return",
    "sealed",
    "super",
    "suspend",
    "tailrec",
    "this",
    "throw",
    "true",
    "try",
    "typealias",
    "typeof",
    "val",
    "var",
    "vararg",
    "when",
    "while",
];

/// Readable replacements applied before the `_` fallback.
const SPECIAL_CHAR_REPLACEMENTS: &[(char, &str)] = &[
    ('$', "Dollar"),
    ('^', "Caret"),
    ('|', "Pipe"),
    ('=', "Equal"),
    ('*', "Star"),
    ('-', "Minus"),
    ('&', "Ampersand"),
    ('%', "Percent"),
    ('#', "Hash"),
    ('@', "At"),
    ('!', "Exclamation"),
    ('+', "Plus"),
    (':', "Colon"),
    (';', "Semicolon"),
    ('>', "Greater_Than"),
    ('<', "Less_Than"),
    ('.', "Period"),
    ('?', "Question_Mark"),
    (',', "Comma"),
    ('\'', "Quote"),
    ('"', "Double_Quote"),
    ('/', "Slash"),
    ('\\', "Back_Slash"),
    ('(', "Left_Parenthesis"),
    (')', "Right_Parenthesis"),
    ('{', "Left_Curly_Bracket"),
    ('}', "Right_Curly_Bracket"),
    ('[', "Left_Square_Bracket"),
    (']', "Right_Square_Bracket"),
    ('~', "Tilde"),
    ('`', "Backtick"),
];

/// Data types whose enum constants are rewritten by [`numeric_enum_var_name`].
pub const NUMERIC_DATA_TYPES: &[&str] = &[
    "kotlin.Short",
    "kotlin.Int",
    "kotlin.Long",
    "kotlin.Float",
    "kotlin.Double",
];

pub const NUMERIC_ENUM_MARKER: &str = "NUMBER";

/// Placeholder for names made only of fallback tokens.
pub const UNDERSCORE_PLACEHOLDER: &str = "Underscore";

/// Sanitize a string into a Kotlin identifier.
///
/// Special characters become words (`-` → `Minus`), anything else outside
/// `[A-Za-z0-9_]` collapses into `_`, a leading digit gets a `_` prefix and a
/// name made only of underscores becomes [`UNDERSCORE_PLACEHOLDER`].
pub fn sanitize_identifier(raw: &str) -> String {
    let mut word = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match SPECIAL_CHAR_REPLACEMENTS.iter().find(|(c, _)| *c == ch) {
            Some((_, replacement)) => word.push_str(replacement),
            None => word.push(ch),
        }
    }

    let mut result = String::with_capacity(word.len());
    let mut in_fallback_run = false;
    for ch in word.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            result.push(ch);
            in_fallback_run = false;
        } else if !in_fallback_run {
            result.push('_');
            in_fallback_run = true;
        }
    }

    if starts_with_digit(&result) {
        result.insert(0, '_');
    }

    if !result.is_empty() && result.chars().all(|c| c == '_') {
        return UNDERSCORE_PLACEHOLDER.to_string();
    }

    result
}

/// Exact, case-sensitive match against [`KOTLIN_RESERVED_WORDS`].
pub fn is_reserved_word(word: &str) -> bool {
    KOTLIN_RESERVED_WORDS.contains(&word)
}

pub fn escape_reserved_word(word: &str) -> String {
    format!("`{word}`")
}

fn escape_if_reserved(word: String) -> String {
    if is_reserved_word(&word) {
        escape_reserved_word(&word)
    } else {
        word
    }
}

fn starts_with_digit(s: &str) -> bool {
    s.starts_with(|c: char| c.is_ascii_digit())
}

/// Apply a casing function without losing the `_` that keeps a digit-led
/// identifier valid (heck drops leading separators).
fn recase(sanitized: &str, case: impl Fn(&str) -> String) -> String {
    let cased = case(sanitized);
    if starts_with_digit(&cased) {
        format!("_{cased}")
    } else {
        cased
    }
}

fn title_case(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// How enum constants are cased.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EnumPropertyNaming {
    Original,
    #[default]
    CamelCase,
    PascalCase,
    SnakeCase,
    UpperCase,
}

impl EnumPropertyNaming {
    pub const ALL: [EnumPropertyNaming; 5] = [
        EnumPropertyNaming::Original,
        EnumPropertyNaming::CamelCase,
        EnumPropertyNaming::PascalCase,
        EnumPropertyNaming::SnakeCase,
        EnumPropertyNaming::UpperCase,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EnumPropertyNaming::Original => "original",
            EnumPropertyNaming::CamelCase => "camelCase",
            EnumPropertyNaming::PascalCase => "PascalCase",
            EnumPropertyNaming::SnakeCase => "snake_case",
            EnumPropertyNaming::UpperCase => "UPPERCASE",
        }
    }

    pub fn parse(value: &str) -> Result<Self, GeneratorError> {
        Self::ALL
            .into_iter()
            .find(|n| n.as_str() == value)
            .ok_or_else(|| GeneratorError::InvalidOption {
                key: crate::options::keys::ENUM_PROPERTY_NAMING.to_string(),
                value: value.to_string(),
                allowed: Self::ALL.map(|n| n.as_str()).join(", "),
            })
    }
}

impl fmt::Display for EnumPropertyNaming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Naming settings of one generator run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamingOptions {
    pub model_name_prefix: String,
    pub model_name_suffix: String,
    pub api_name_suffix: String,
    pub enum_property_naming: EnumPropertyNaming,
}

impl NamingOptions {
    pub fn model_name(&self, name: &str) -> String {
        to_model_name(name, &self.model_name_prefix, &self.model_name_suffix)
    }

    pub fn api_name(&self, tag: &str) -> String {
        to_api_name(tag, &self.api_name_suffix)
    }

    pub fn enum_var_name(&self, value: &str, data_type: &str) -> String {
        to_enum_var_name(value, data_type, self.enum_property_naming)
    }
}

/// Class name for a schema. Fully qualified `kotlin.`/`java.` types pass
/// through untouched.
pub fn to_model_name(name: &str, prefix: &str, suffix: &str) -> String {
    if name.starts_with("kotlin.") || name.starts_with("java.") {
        return name.to_string();
    }
    let sanitized = sanitize_identifier(&name.replace('.', ""));
    let camelized = escape_if_reserved(recase(&sanitized, |s| s.to_pascal_case()));
    format!("{prefix}{}{suffix}", title_case(&camelized))
}

/// Property or parameter identifier.
pub fn to_var_name(name: &str) -> String {
    let sanitized = sanitize_identifier(name);
    escape_if_reserved(recase(&sanitized, |s| s.to_lower_camel_case()))
}

/// API class name for an operation tag.
pub fn to_api_name(tag: &str, suffix: &str) -> String {
    let sanitized = sanitize_identifier(tag);
    format!("{}Api{suffix}", recase(&sanitized, |s| s.to_pascal_case()))
}

/// Enum constant name for `value` of an enum typed `data_type`.
pub fn to_enum_var_name(value: &str, data_type: &str, naming: EnumPropertyNaming) -> String {
    if NUMERIC_DATA_TYPES.contains(&data_type) {
        return numeric_enum_var_name(value);
    }
    if value.is_empty() {
        return "EMPTY".to_string();
    }
    let sanitized = sanitize_identifier(value);
    let modified = match naming {
        EnumPropertyNaming::Original => value.to_string(),
        EnumPropertyNaming::CamelCase => recase(&sanitized, |s| s.to_lower_camel_case()),
        EnumPropertyNaming::PascalCase => recase(&sanitized, |s| s.to_pascal_case()),
        EnumPropertyNaming::SnakeCase => recase(&sanitized, |s| s.to_snake_case()),
        EnumPropertyNaming::UpperCase => sanitized.to_uppercase(),
    };
    escape_if_reserved(modified)
}

/// `-1.5` → `NUMBERMINUS_1_DOT_5`.
///
/// Works on the raw literal so the sign and decimal point stay traceable.
pub fn numeric_enum_var_name(value: &str) -> String {
    format!("{NUMERIC_ENUM_MARKER}{value}")
        .replace('-', "MINUS_")
        .replace('+', "PLUS_")
        .replace('.', "_DOT_")
}

/// Derive a camelCase operation name from HTTP method + path, used when an
/// operation has no `operationId`.
///
/// - `GET /users` → `listUsers`
/// - `GET /users/{userId}` → `getUser`
/// - `POST /users/{userId}/messages` → `createUsersMessages`
pub fn route_to_name(method: &str, path: &str) -> String {
    let mut resource_parts: Vec<&str> = Vec::new();
    let mut ends_with_param = false;

    for seg in path.split('/').filter(|s| !s.is_empty()) {
        if seg.starts_with('{') && seg.ends_with('}') {
            ends_with_param = true;
        } else {
            resource_parts.push(seg);
            ends_with_param = false;
        }
    }

    let method_upper = method.to_uppercase();
    let prefix = match method_upper.as_str() {
        "GET" if ends_with_param => "get",
        "GET" => "list",
        "POST" => "create",
        "PUT" => "update",
        "DELETE" => "delete",
        "PATCH" => "patch",
        "OPTIONS" => "options",
        "HEAD" => "head",
        _ => "call",
    };

    let last = resource_parts.len().saturating_sub(1);
    let resource: String = resource_parts
        .iter()
        .enumerate()
        .map(|(i, part)| {
            let word = if i == last && ends_with_param {
                singularize(part)
            } else {
                part.to_string()
            };
            sanitize_identifier(&word).to_pascal_case()
        })
        .collect();

    format!("{prefix}{resource}")
}

fn singularize(word: &str) -> String {
    if word.ends_with("ies") && word.len() > 3 {
        format!("{}y", &word[..word.len() - 3])
    } else if word.ends_with("ses") || word.ends_with("xes") || word.ends_with("zes") {
        word[..word.len() - 2].to_string()
    } else if word.ends_with('s') && !word.ends_with("ss") && word.len() > 1 {
        word[..word.len() - 1].to_string()
    } else {
        word.to_string()
    }
}
