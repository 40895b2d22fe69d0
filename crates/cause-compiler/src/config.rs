// SPDX-License-Identifier: (MIT OR Apache-2.0)

use cause_ast::DEFAULT_NAMESPACE;

pub struct CompileOptions {
    /// Identifier that names the dependency runtime in source and output.
    pub namespace: String,
    /// Treat free variables without a binding as a compile error.
    pub strict_free_variables: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            strict_free_variables: false,
        }
    }
}
