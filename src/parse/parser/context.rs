use crate::{
    ast::Expr,
    errors::{Diagnostic, DiagnosticCode},
    parse::parser::{ParseFailed, ParseResult, Parser, Restrictions},
};

/// Ambient state that productions adjust for the duration of a sub-parse.
/// It is only ever changed through a `ParseScope`, which puts it back when
/// dropped.
#[derive(Clone, Debug, Default)]
pub struct ParseContext {
    pub restrictions: Restrictions,
    pub description: Option<String>,
    pub tail: TailState,
    pub rest_allowed: bool,
    pub depth: usize,
}

/// The block-tail protocol: whether a trailing expression right before `}`
/// may become the enclosing block's value, and the slot holding it until the
/// block parser drains it.
#[derive(Clone, Debug, Default)]
pub struct TailState {
    pub allow: bool,
    pub pending: Option<Expr>,
}

pub(crate) enum Undo {
    Restrictions(Restrictions),
    Description(Option<String>),
    Tail(TailState),
    RestAllowed(bool),
    Depth(usize),
}

pub(crate) struct ParseScope<'a> {
    pub(crate) p: &'a mut Parser,
    pub(crate) undo: Vec<Undo>,
}

impl<'a> std::ops::Deref for ParseScope<'a> {
    type Target = Parser;
    fn deref(&self) -> &Self::Target {
        self.p
    }
}

impl<'a> std::ops::DerefMut for ParseScope<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.p
    }
}

impl<'a> ParseScope<'a> {
    pub fn with_restrictions(mut self, r: Restrictions) -> Self {
        let prev = self.p.ctx.restrictions;
        self.p.ctx.restrictions |= r;
        self.undo.push(Undo::Restrictions(prev));
        self
    }

    pub fn without_restrictions(mut self, r: Restrictions) -> Self {
        let prev = self.p.ctx.restrictions;
        self.p.ctx.restrictions.remove(r);
        self.undo.push(Undo::Restrictions(prev));
        self
    }

    pub fn with_description(mut self, s: impl Into<String>) -> Self {
        let desc = s.into();
        log::debug!("new context: {}", desc);
        let prev = self.p.ctx.description.replace(desc);
        self.undo.push(Undo::Description(prev));
        self
    }

    /// Starts a fresh tail slot for a nested block. The caller's slot,
    /// including anything pending in it, comes back when the scope drops.
    pub fn with_block_tail(mut self, allow: bool) -> Self {
        let prev = std::mem::replace(
            &mut self.p.ctx.tail,
            TailState {
                allow,
                pending: None,
            },
        );
        log::debug!(
            "[with_block_tail] allow={} (was allow={}, pending={})",
            allow,
            prev.allow,
            prev.pending.is_some()
        );
        self.undo.push(Undo::Tail(prev));
        self
    }

    pub fn with_rest_allowed(mut self, allowed: bool) -> Self {
        let prev = std::mem::replace(&mut self.p.ctx.rest_allowed, allowed);
        self.undo.push(Undo::RestAllowed(prev));
        self
    }

    /// Enters one more level of nesting, failing once the configured
    /// maximum depth is exceeded.
    pub fn deeper(mut self, what: &str) -> ParseResult<Self> {
        let prev = self.p.ctx.depth;
        self.p.ctx.depth += 1;
        self.undo.push(Undo::Depth(prev));
        let max_depth = self.p.options.max_depth;
        if self.p.ctx.depth > max_depth {
            let span = self.p.current().span;
            let diag = Diagnostic::error(format!("{} nests too deeply", what), span)
                .with_code(DiagnosticCode::TooDeep)
                .with_note(format!("the nesting limit is {}", max_depth));
            self.p.record(diag);
            return Err(ParseFailed);
        }
        Ok(self)
    }
}

impl<'a> Drop for ParseScope<'a> {
    fn drop(&mut self) {
        while let Some(u) = self.undo.pop() {
            match u {
                Undo::Restrictions(prev) => self.p.ctx.restrictions = prev,
                Undo::Description(prev) => self.p.ctx.description = prev,
                Undo::Tail(prev) => {
                    if let Some(leaked) = &self.p.ctx.tail.pending {
                        log::debug!(
                            "[ParseScope::drop] discarding undrained tail at {}",
                            leaked.span
                        );
                    }
                    self.p.ctx.tail = prev;
                }
                Undo::RestAllowed(prev) => self.p.ctx.rest_allowed = prev,
                Undo::Depth(prev) => self.p.ctx.depth = prev,
            }
        }
    }
}
