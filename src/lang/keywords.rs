//! Reserved word tables.
//!
//! `*_KEYWORDS` are language keywords proper. `*_SPECIAL_IDS` are names a
//! rename would break without being keywords: standard library entry points,
//! well-known macros and builtins.

pub(crate) const C_KEYWORDS: &[&str] = &[
    "auto", "break", "case", "char", "const", "continue", "default", "do", "double", "else",
    "enum", "extern", "float", "for", "goto", "if", "inline", "int", "long", "register",
    "restrict", "return", "short", "signed", "sizeof", "static", "struct", "switch", "typedef",
    "union", "unsigned", "void", "volatile", "while", "_Alignas", "_Alignof", "_Atomic", "_Bool",
    "_Complex", "_Generic", "_Imaginary", "_Noreturn", "_Static_assert", "_Thread_local",
    "__func__",
];

pub(crate) const C_SPECIAL_IDS: &[&str] = &[
    "main", "NULL", "EOF", "FILE", "size_t", "ssize_t", "stdin", "stdout", "stderr", "errno",
    "printf", "scanf", "fprintf", "fscanf", "sprintf", "snprintf", "sscanf", "puts", "gets",
    "fgets", "fputs", "putchar", "getchar", "fopen", "fclose", "fread", "fwrite", "fflush",
    "fseek", "ftell", "rewind", "feof", "ferror", "perror", "malloc", "calloc", "realloc",
    "free", "exit", "abort", "atoi", "atol", "atof", "strtol", "strtoul", "strtod", "qsort",
    "bsearch", "abs", "rand", "srand", "memcpy", "memmove", "memset", "memcmp", "strcpy",
    "strncpy", "strcat", "strncat", "strcmp", "strncmp", "strlen", "strchr", "strrchr", "strstr",
    "strdup", "assert", "true", "false", "bool", "uint8_t", "uint16_t", "uint32_t", "uint64_t",
    "int8_t", "int16_t", "int32_t", "int64_t", "INT_MAX", "INT_MIN", "UINT_MAX",
];

pub(crate) const CPP_KEYWORDS: &[&str] = &[
    "alignas", "alignof", "and", "and_eq", "asm", "auto", "bitand", "bitor", "bool", "break",
    "case", "catch", "char", "char16_t", "char32_t", "class", "compl", "concept", "const",
    "consteval", "constexpr", "const_cast", "continue", "co_await", "co_return", "co_yield",
    "decltype", "default", "delete", "do", "double", "dynamic_cast", "else", "enum", "explicit",
    "export", "extern", "false", "float", "for", "friend", "goto", "if", "inline", "int", "long",
    "mutable", "namespace", "new", "noexcept", "not", "not_eq", "nullptr", "operator", "or",
    "or_eq", "private", "protected", "public", "register", "reinterpret_cast", "requires",
    "return", "short", "signed", "sizeof", "static", "static_assert", "static_cast", "struct",
    "switch", "template", "this", "thread_local", "throw", "true", "try", "typedef", "typeid",
    "typename", "union", "unsigned", "using", "virtual", "void", "volatile", "wchar_t", "while",
    "xor", "xor_eq", "override", "final",
];

pub(crate) const CPP_SPECIAL_IDS: &[&str] = &[
    "main", "std", "cin", "cout", "cerr", "endl", "string", "vector", "map", "set", "pair",
    "NULL", "size_t", "printf", "scanf", "malloc", "free", "memset", "memcpy", "strlen",
];

pub(crate) const JAVA_KEYWORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "final", "finally",
    "float", "for", "goto", "if", "implements", "import", "instanceof", "int", "interface",
    "long", "native", "new", "package", "private", "protected", "public", "return", "short",
    "static", "strictfp", "super", "switch", "synchronized", "this", "throw", "throws",
    "transient", "try", "void", "volatile", "while", "true", "false", "null", "var", "record",
    "yield", "sealed", "permits",
];

pub(crate) const JAVA_SPECIAL_IDS: &[&str] = &[
    "main", "String", "Object", "System", "Integer", "Long", "Double", "Float", "Boolean",
    "Character", "Math", "List", "ArrayList", "Map", "HashMap", "Set", "HashSet", "Exception",
    "RuntimeException", "Override", "length", "args", "out", "println", "print", "equals",
    "hashCode", "toString",
];

pub(crate) const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

pub(crate) const PYTHON_SPECIAL_IDS: &[&str] = &[
    "self", "cls", "print", "len", "range", "int", "str", "float", "list", "dict", "set",
    "tuple", "bool", "object", "type", "open", "input", "map", "filter", "zip", "enumerate",
    "sorted", "min", "max", "sum", "abs", "super", "isinstance", "Exception", "__init__",
    "__name__", "__main__",
];

pub(crate) const GO_KEYWORDS: &[&str] = &[
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough",
    "for", "func", "go", "goto", "if", "import", "interface", "map", "package", "range",
    "return", "select", "struct", "switch", "type", "var",
];

pub(crate) const GO_SPECIAL_IDS: &[&str] = &[
    "main", "bool", "byte", "rune", "int", "int8", "int16", "int32", "int64", "uint", "uint8",
    "uint16", "uint32", "uint64", "uintptr", "float32", "float64", "complex64", "complex128",
    "string", "error", "true", "false", "iota", "nil", "append", "cap", "close", "copy",
    "delete", "len", "make", "new", "panic", "print", "println", "recover", "fmt",
];

pub(crate) const JAVASCRIPT_KEYWORDS: &[&str] = &[
    "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "enum", "export", "extends", "false", "finally", "for", "function",
    "if", "implements", "import", "in", "instanceof", "interface", "let", "new", "null",
    "package", "private", "protected", "public", "return", "static", "super", "switch", "this",
    "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield", "async", "of",
];

pub(crate) const JAVASCRIPT_SPECIAL_IDS: &[&str] = &[
    "undefined", "NaN", "Infinity", "arguments", "eval", "console", "window", "document",
    "require", "module", "exports", "Object", "Array", "String", "Number", "Boolean", "Math",
    "JSON", "Promise", "Error", "length", "prototype", "constructor",
];

pub(crate) const PHP_KEYWORDS: &[&str] = &[
    "abstract", "and", "array", "as", "break", "callable", "case", "catch", "class", "clone",
    "const", "continue", "declare", "default", "do", "echo", "else", "elseif", "empty",
    "enddeclare", "endfor", "endforeach", "endif", "endswitch", "endwhile", "eval", "exit",
    "extends", "final", "finally", "fn", "for", "foreach", "function", "global", "goto", "if",
    "implements", "include", "include_once", "instanceof", "insteadof", "interface", "isset",
    "list", "match", "namespace", "new", "or", "print", "private", "protected", "public",
    "readonly", "require", "require_once", "return", "static", "switch", "throw", "trait",
    "try", "unset", "use", "var", "while", "xor", "yield", "true", "false", "null",
];

pub(crate) const PHP_SPECIAL_IDS: &[&str] = &[
    "$this", "$_GET", "$_POST", "$_SERVER", "$_SESSION", "$_COOKIE", "$_FILES", "$_REQUEST",
    "$_ENV", "$GLOBALS", "self", "parent", "__construct", "__destruct",
];

pub(crate) const RUBY_KEYWORDS: &[&str] = &[
    "BEGIN", "END", "alias", "and", "begin", "break", "case", "class", "def", "defined?", "do",
    "else", "elsif", "end", "ensure", "false", "for", "if", "in", "module", "next", "nil",
    "not", "or", "redo", "rescue", "retry", "return", "self", "super", "then", "true", "undef",
    "unless", "until", "when", "while", "yield", "__FILE__", "__LINE__", "__method__",
];

pub(crate) const RUBY_SPECIAL_IDS: &[&str] = &[
    "puts", "print", "p", "require", "require_relative", "attr_accessor", "attr_reader",
    "attr_writer", "initialize", "new", "raise", "lambda", "proc", "loop", "each", "map",
];

/// Special tokens emitted by masked language models.
pub(crate) const MODEL_SPECIAL_TOKENS: &[&str] = &[
    "<s>", "</s>", "<pad>", "<unk>", "<mask>", "[CLS]", "[SEP]", "[PAD]", "[UNK]", "[MASK]",
];
