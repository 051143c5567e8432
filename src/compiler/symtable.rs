use std::collections::HashMap;

use crate::{
    compiler::{builtins::Builtin, codegen::Operand, types::ValueType},
    error::{CompileResult, SemanticError},
};

/// A declared variable or parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub ty:          ValueType,
    pub initialized: bool,
    /// Declared with `let`, or a parameter.
    pub constant:    bool,
    /// Where the value lives at run time. Fixed at declaration.
    pub storage:     Operand,
}

/// One parameter of a function signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// The call site label, `None` when declared as `_`.
    pub label: Option<String>,
    /// The name used inside the body.
    pub name:  String,
    pub ty:    ValueType,
}

/// The callable shape of a user or built-in function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub params:   Vec<Param>,
    pub ret:      ValueType,
    /// Accepts any number of arguments of any type.
    pub variadic: bool,
    /// Set for functions expanded inline by the compiler.
    pub builtin:  Option<Builtin>,
}

#[derive(Debug)]
struct Scope {
    id:        usize,
    variables: HashMap<String, Variable>,
}

/// Nested variable scopes plus the global function namespace.
///
/// Lookups walk the scopes from the innermost outwards, so an inner
/// declaration shadows an outer one of the same name.
#[derive(Debug)]
pub struct SymbolTable {
    scopes:        Vec<Scope>,
    functions:     HashMap<String, Signature>,
    next_scope_id: usize,
}

#[allow(clippy::new_without_default)]
impl SymbolTable {
    /// Creates a table with one global scope and every built-in function.
    #[must_use]
    pub fn new() -> Self {
        let functions = Builtin::ALL.iter()
                                    .map(|builtin| (builtin.name().to_string(), builtin.signature()))
                                    .collect();

        Self { scopes: vec![Scope { id:        0,
                                    variables: HashMap::new(), }],
               functions,
               next_scope_id: 1 }
    }

    /// Opens a new innermost scope and returns its id.
    pub fn push_scope(&mut self) -> usize {
        let id = self.next_scope_id;
        self.next_scope_id += 1;
        self.scopes.push(Scope { id,
                                 variables: HashMap::new() });
        id
    }

    /// Closes the innermost scope. The global scope is never closed.
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Id of the innermost scope.
    #[must_use]
    pub fn scope_id(&self) -> usize {
        self.scopes.last().map_or(0, |scope| scope.id)
    }

    /// Returns `true` while only the global scope is open.
    #[must_use]
    pub fn at_top_level(&self) -> bool {
        self.scopes.len() == 1
    }

    /// Unique runtime name for `name` declared in the innermost scope.
    #[must_use]
    pub fn storage_name(&self, name: &str) -> String {
        format!("{name}${}", self.scope_id())
    }

    /// Declares a variable in the innermost scope.
    ///
    /// # Errors
    /// Returns [`SemanticError::Redefinition`] if the innermost scope already
    /// has a variable of the same name.
    pub fn declare(&mut self, name: &str, variable: Variable, line: usize) -> CompileResult<()> {
        let Some(scope) = self.scopes.last_mut() else {
            return Err(SemanticError::Redefinition { name: name.to_string(),
                                                     line }.into());
        };

        if scope.variables.contains_key(name) {
            return Err(SemanticError::Redefinition { name: name.to_string(),
                                                     line }.into());
        }

        scope.variables.insert(name.to_string(), variable);
        Ok(())
    }

    /// Finds the innermost variable called `name`.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Variable> {
        self.scopes.iter().rev().find_map(|scope| scope.variables.get(name))
    }

    /// Mutable counterpart of [`SymbolTable::lookup`].
    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut Variable> {
        self.scopes.iter_mut().rev().find_map(|scope| scope.variables.get_mut(name))
    }

    #[must_use]
    pub fn function(&self, name: &str) -> Option<&Signature> {
        self.functions.get(name)
    }

    /// Registers a user function.
    ///
    /// # Errors
    /// Returns [`SemanticError::Redefinition`] if the name is taken by a
    /// built-in or another user function.
    pub fn declare_function(&mut self,
                            name: &str,
                            signature: Signature,
                            line: usize)
                            -> CompileResult<()> {
        if self.functions.contains_key(name) {
            return Err(SemanticError::Redefinition { name: name.to_string(),
                                                     line }.into());
        }

        self.functions.insert(name.to_string(), signature);
        Ok(())
    }
}
