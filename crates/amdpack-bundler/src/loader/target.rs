//! ECMAScript target levels and the syntax each one allows in the runtime.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// ECMAScript level the compiler was asked to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EsTarget {
    #[default]
    Es3,
    Es5,
    Es6,
    Es2015,
    Es2016,
    Es2017,
    Es2018,
    EsNext,
}

impl EsTarget {
    pub const ALL: [EsTarget; 8] = [
        EsTarget::Es3,
        EsTarget::Es5,
        EsTarget::Es6,
        EsTarget::Es2015,
        EsTarget::Es2016,
        EsTarget::Es2017,
        EsTarget::Es2018,
        EsTarget::EsNext,
    ];

    /// Lenient lookup: case-insensitive, unknown names fall back to `Es3`.
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or(EsTarget::Es3)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EsTarget::Es3 => "es3",
            EsTarget::Es5 => "es5",
            EsTarget::Es6 => "es6",
            EsTarget::Es2015 => "es2015",
            EsTarget::Es2016 => "es2016",
            EsTarget::Es2017 => "es2017",
            EsTarget::Es2018 => "es2018",
            EsTarget::EsNext => "esnext",
        }
    }

    /// Syntax available to the loader runtime at this level.
    pub fn capabilities(&self) -> Capabilities {
        match self {
            EsTarget::Es3 => Capabilities::default(),
            EsTarget::Es5 => Capabilities {
                define_property: true,
                ..Capabilities::default()
            },
            EsTarget::Es6
            | EsTarget::Es2015
            | EsTarget::Es2016
            | EsTarget::Es2017
            | EsTarget::Es2018 => Capabilities {
                define_property: true,
                block_scoping: true,
                arrow_functions: true,
                spread_arguments: true,
                optional_catch_binding: false,
            },
            EsTarget::EsNext => Capabilities {
                define_property: true,
                block_scoping: true,
                arrow_functions: true,
                spread_arguments: true,
                optional_catch_binding: true,
            },
        }
    }
}

impl fmt::Display for EsTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EsTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == lower)
            .ok_or_else(|| {
                format!(
                    "unknown ES target '{}' (expected one of: es3, es5, es6, es2015, es2016, es2017, es2018, esnext)",
                    s
                )
            })
    }
}

/// Language features the runtime template may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Capabilities {
    /// `Object.defineProperty` (ES5)
    pub define_property: bool,
    /// `const` / `let` (ES2015)
    pub block_scoping: bool,
    /// `(x) => {}` (ES2015)
    pub arrow_functions: bool,
    /// `f(...args)` (ES2015)
    pub spread_arguments: bool,
    /// `catch {}` without a binding (ES2019)
    pub optional_catch_binding: bool,
}
