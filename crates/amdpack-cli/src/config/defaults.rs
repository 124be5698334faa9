use crate::compiler::DEFAULT_COMPILER;

pub fn default_compiler() -> String {
    DEFAULT_COMPILER.to_string()
}

pub fn default_debounce_ms() -> u64 {
    50
}

pub fn default_settle_tick_ms() -> u64 {
    100
}

pub fn default_settle_timeout_ms() -> u64 {
    1000
}
