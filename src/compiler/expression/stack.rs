use crate::compiler::{expression::precedence::Symbol, lexer::Token, types::ValueType};

/// One entry of the expression stack.
///
/// `source` points back into the token buffer the statement parser owns. It
/// is kept for operands and for results that are still a bare literal, since
/// promotion and division depend on literal kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackItem<'a> {
    pub symbol: Symbol,
    pub ty:     ValueType,
    pub source: Option<&'a (Token, usize)>,
}

impl<'a> StackItem<'a> {
    /// An item for a shifted token.
    #[must_use]
    pub const fn terminal(symbol: Symbol, ty: ValueType, source: &'a (Token, usize)) -> Self {
        Self { symbol,
               ty,
               source: Some(source) }
    }

    /// A reduced sub-expression.
    #[must_use]
    pub const fn result(ty: ValueType, source: Option<&'a (Token, usize)>) -> Self {
        Self { symbol: Symbol::Result,
               ty,
               source }
    }

    /// Returns `true` if this item is exactly an integer literal.
    #[must_use]
    pub const fn is_int_literal(&self) -> bool {
        matches!(self.source, Some((Token::Integer(_), _)))
    }

    /// Returns `true` if this item is exactly a double literal.
    #[must_use]
    pub const fn is_double_literal(&self) -> bool {
        matches!(self.source, Some((Token::Double(_), _)))
    }
}

const fn marker(symbol: Symbol) -> StackItem<'static> {
    StackItem { symbol,
                ty: ValueType::Undefined,
                source: None }
}

/// The working stack of one expression.
///
/// Created with the end marker at the bottom. The end marker stays there
/// until the driver has finished, at which point a successful parse leaves
/// exactly one result above it.
#[derive(Debug)]
pub struct OperandStack<'a> {
    items: Vec<StackItem<'a>>,
}

#[allow(clippy::new_without_default)]
impl<'a> OperandStack<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self { items: vec![marker(Symbol::End)] }
    }

    pub fn push(&mut self, item: StackItem<'a>) {
        self.items.push(item);
    }

    /// Removes the top `count` items.
    pub fn pop_n(&mut self, count: usize) {
        let keep = self.items.len().saturating_sub(count);
        self.items.truncate(keep);
    }

    /// The topmost item that is neither a result nor a boundary.
    ///
    /// # Example
    /// ```
    /// use ifj23c::compiler::{
    ///     expression::{
    ///         precedence::Symbol,
    ///         stack::{OperandStack, StackItem},
    ///     },
    ///     types::ValueType,
    /// };
    ///
    /// let mut stack = OperandStack::new();
    /// stack.push(StackItem::result(ValueType::Int, None));
    /// assert_eq!(stack.top_terminal(), Symbol::End);
    /// ```
    #[must_use]
    pub fn top_terminal(&self) -> Symbol {
        self.items
            .iter()
            .rev()
            .map(|item| item.symbol)
            .find(|symbol| symbol.is_terminal())
            .unwrap_or(Symbol::End)
    }

    /// Inserts a boundary right above the topmost terminal, below any results
    /// stacked on it.
    pub fn push_boundary(&mut self) {
        let at = self.items
                     .iter()
                     .rposition(|item| item.symbol.is_terminal())
                     .map_or(self.items.len(), |index| index + 1);
        self.items.insert(at, marker(Symbol::Boundary));
    }

    /// The items above the most recent boundary, bottom first.
    ///
    /// Without a boundary this is the whole stack.
    #[must_use]
    pub fn handle(&self) -> &[StackItem<'a>] {
        let start = self.items
                        .iter()
                        .rposition(|item| item.symbol == Symbol::Boundary)
                        .map_or(0, |index| index + 1);
        &self.items[start..]
    }

    /// Replaces the handle and its boundary with `result`.
    pub fn reduce(&mut self, result: StackItem<'a>) {
        let span = self.handle().len();
        self.pop_n(span + 1);
        self.push(result);
    }

    /// Returns `true` if a boundary is anywhere on the stack.
    #[must_use]
    pub fn has_boundary(&self) -> bool {
        self.items.iter().any(|item| item.symbol == Symbol::Boundary)
    }

    /// The finished result, if the stack holds exactly the end marker and one
    /// result.
    #[must_use]
    pub fn finished(&self) -> Option<StackItem<'a>> {
        match self.items.as_slice() {
            [bottom, result] if bottom.symbol == Symbol::End && result.symbol == Symbol::Result => {
                Some(*result)
            },
            _ => None,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
