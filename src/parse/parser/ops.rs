use super::{ExprResult, Parser, Restrictions};

use crate::ast::{self, token::TokenKind, AssignOp, BinaryOp, UnaryOp};

/// Binding power of operators, weakest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Precedence {
    Lowest,
    Assignment,
    Range,
    LogicalOr,
    LogicalAnd,
    Equality,
    Comparison,
    BitOr,
    BitXor,
    BitAnd,
    Additive,
    Multiplicative,
    Cast,
    Prefix,
    Postfix,
}

impl Precedence {
    /// The level just below this one, used as the floor when parsing the
    /// right operand of a right-associative operator.
    pub fn below(self) -> Precedence {
        match self {
            Precedence::Lowest | Precedence::Assignment => Precedence::Lowest,
            Precedence::Range => Precedence::Assignment,
            Precedence::LogicalOr => Precedence::Range,
            Precedence::LogicalAnd => Precedence::LogicalOr,
            Precedence::Equality => Precedence::LogicalAnd,
            Precedence::Comparison => Precedence::Equality,
            Precedence::BitOr => Precedence::Comparison,
            Precedence::BitXor => Precedence::BitOr,
            Precedence::BitAnd => Precedence::BitXor,
            Precedence::Additive => Precedence::BitAnd,
            Precedence::Multiplicative => Precedence::Additive,
            Precedence::Cast => Precedence::Multiplicative,
            Precedence::Prefix => Precedence::Cast,
            Precedence::Postfix => Precedence::Prefix,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PrefixRule {
    Literal,
    Name,
    Group,
    Array,
    Curly,
    Unary(UnaryOp),
    Ref,
    DoubleRef,
    RangeTo { inclusive: bool },
    If,
    Match,
    Closure,
    Unsafe,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum InfixRule {
    Binary(BinaryOp),
    Assign(AssignOp),
    Send,
    Range { inclusive: bool },
    Cast,
    Call,
    Index,
    Field,
    Path,
    Try,
    StructLiteral,
}

pub(crate) fn prefix_rule(kind: TokenKind) -> Option<PrefixRule> {
    Some(match kind {
        TokenKind::Int
        | TokenKind::Float
        | TokenKind::Str
        | TokenKind::Char
        | TokenKind::True
        | TokenKind::False => PrefixRule::Literal,
        TokenKind::Ident => PrefixRule::Name,
        TokenKind::LeftParen => PrefixRule::Group,
        TokenKind::LeftBracket => PrefixRule::Array,
        TokenKind::LeftCurly => PrefixRule::Curly,
        TokenKind::Minus => PrefixRule::Unary(UnaryOp::Neg),
        TokenKind::Exclamation => PrefixRule::Unary(UnaryOp::Not),
        TokenKind::Asterisk => PrefixRule::Unary(UnaryOp::Deref),
        TokenKind::LeftArrow => PrefixRule::Unary(UnaryOp::Recv),
        TokenKind::Ampersand => PrefixRule::Ref,
        TokenKind::DoubleAmpersand => PrefixRule::DoubleRef,
        TokenKind::DotDot => PrefixRule::RangeTo { inclusive: false },
        TokenKind::DotDotEq => PrefixRule::RangeTo { inclusive: true },
        TokenKind::If => PrefixRule::If,
        TokenKind::Match => PrefixRule::Match,
        TokenKind::Pipe | TokenKind::DoublePipe => PrefixRule::Closure,
        TokenKind::Unsafe => PrefixRule::Unsafe,
        _ => return None,
    })
}

pub(crate) fn infix_rule(kind: TokenKind) -> Option<(InfixRule, Precedence)> {
    Some(match kind {
        TokenKind::Equals => (InfixRule::Assign(AssignOp::Assign), Precedence::Assignment),
        TokenKind::PlusEq => (InfixRule::Assign(AssignOp::Add), Precedence::Assignment),
        TokenKind::MinusEq => (InfixRule::Assign(AssignOp::Sub), Precedence::Assignment),
        TokenKind::AsteriskEq => (InfixRule::Assign(AssignOp::Mul), Precedence::Assignment),
        TokenKind::SlashEq => (InfixRule::Assign(AssignOp::Div), Precedence::Assignment),
        TokenKind::PercentEq => (InfixRule::Assign(AssignOp::Mod), Precedence::Assignment),
        TokenKind::LeftArrow => (InfixRule::Send, Precedence::Assignment),
        TokenKind::DotDot => (InfixRule::Range { inclusive: false }, Precedence::Range),
        TokenKind::DotDotEq => (InfixRule::Range { inclusive: true }, Precedence::Range),
        TokenKind::DoublePipe => (InfixRule::Binary(BinaryOp::Or), Precedence::LogicalOr),
        TokenKind::DoubleAmpersand => (InfixRule::Binary(BinaryOp::And), Precedence::LogicalAnd),
        TokenKind::EqEq => (InfixRule::Binary(BinaryOp::Eq), Precedence::Equality),
        TokenKind::NotEq => (InfixRule::Binary(BinaryOp::NotEq), Precedence::Equality),
        TokenKind::Lt => (InfixRule::Binary(BinaryOp::Lt), Precedence::Comparison),
        TokenKind::LtEq => (InfixRule::Binary(BinaryOp::LtEq), Precedence::Comparison),
        TokenKind::Gt => (InfixRule::Binary(BinaryOp::Gt), Precedence::Comparison),
        TokenKind::GtEq => (InfixRule::Binary(BinaryOp::GtEq), Precedence::Comparison),
        TokenKind::Pipe => (InfixRule::Binary(BinaryOp::BitOr), Precedence::BitOr),
        TokenKind::Caret => (InfixRule::Binary(BinaryOp::BitXor), Precedence::BitXor),
        TokenKind::Ampersand => (InfixRule::Binary(BinaryOp::BitAnd), Precedence::BitAnd),
        TokenKind::Plus => (InfixRule::Binary(BinaryOp::Add), Precedence::Additive),
        TokenKind::Minus => (InfixRule::Binary(BinaryOp::Sub), Precedence::Additive),
        TokenKind::Asterisk => (InfixRule::Binary(BinaryOp::Mul), Precedence::Multiplicative),
        TokenKind::Slash => (InfixRule::Binary(BinaryOp::Div), Precedence::Multiplicative),
        TokenKind::Percent => (InfixRule::Binary(BinaryOp::Mod), Precedence::Multiplicative),
        TokenKind::As => (InfixRule::Cast, Precedence::Cast),
        TokenKind::LeftParen => (InfixRule::Call, Precedence::Postfix),
        TokenKind::LeftBracket => (InfixRule::Index, Precedence::Postfix),
        TokenKind::Dot => (InfixRule::Field, Precedence::Postfix),
        TokenKind::DoubleColon => (InfixRule::Path, Precedence::Postfix),
        TokenKind::Question => (InfixRule::Try, Precedence::Postfix),
        TokenKind::LeftCurly => (InfixRule::StructLiteral, Precedence::Postfix),
        _ => return None,
    })
}

impl Parser {
    pub(crate) fn parse_expr(&mut self) -> ExprResult {
        self.parse_expr_with(Precedence::Lowest)
    }

    /// Parses an expression whose operators all bind tighter than `min`.
    pub(crate) fn parse_expr_with(&mut self, min: Precedence) -> ExprResult {
        let parser = &mut self.scope().deeper("expression")?;
        let mut lhs = parser.parse_prefix_expr()?;

        while let Some((rule, prec)) = infix_rule(parser.kind()) {
            if prec <= min {
                break;
            }

            if rule == InfixRule::StructLiteral && !parser.at_struct_literal(&lhs) {
                break;
            }

            lhs = parser.parse_infix_expr(rule, prec, lhs)?;
        }

        Ok(lhs)
    }

    /// Parses one prefix expression: an operand, or a prefix operator and
    /// its operand. Postfix and infix operators are left for the caller.
    pub(crate) fn parse_prefix_expr(&mut self) -> ExprResult {
        let rule = match prefix_rule(self.kind()) {
            Some(rule) => rule,
            None => return Err(self.expected("an expression")),
        };
        log::trace!("[parse_prefix_expr] {:?} at {}", rule, self.current().span);

        match rule {
            PrefixRule::Literal => self.parse_literal_expr(),
            PrefixRule::Name => self.parse_name_expr(),
            PrefixRule::Group => self.parse_paren_expr(),
            PrefixRule::Array => self.parse_array_expr(),
            PrefixRule::Curly => self.parse_curly_expr(),
            PrefixRule::Unary(op) => self.parse_unary_expr(op),
            PrefixRule::Ref => self.parse_ref_expr(),
            PrefixRule::DoubleRef => self.parse_double_ref_expr(),
            PrefixRule::RangeTo { inclusive } => self.parse_range_to_expr(inclusive),
            PrefixRule::If => self.parse_if_expr(),
            PrefixRule::Match => self.parse_match_expr(),
            PrefixRule::Closure => self.parse_closure_expr(),
            PrefixRule::Unsafe => self.parse_unsafe_expr(),
        }
    }

    fn parse_infix_expr(
        &mut self,
        rule: InfixRule,
        prec: Precedence,
        lhs: ast::Expr,
    ) -> ExprResult {
        log::trace!("[parse_infix_expr] {:?} at {}", rule, self.current().span);
        match rule {
            InfixRule::Binary(op) => {
                self.bump();
                let rhs = self.parse_expr_with(prec)?;
                let span = lhs.span.merge(&rhs.span);
                Ok(ast::Expr::new(
                    ast::ExprKind::Binary {
                        op,
                        lhs: Box::new(lhs),
                        rhs: Box::new(rhs),
                    },
                    span,
                ))
            }
            InfixRule::Assign(op) => {
                self.bump();
                let rhs = self.parse_expr_with(prec.below())?;
                let span = lhs.span.merge(&rhs.span);
                Ok(ast::Expr::new(
                    ast::ExprKind::Assign {
                        op,
                        lhs: Box::new(lhs),
                        rhs: Box::new(rhs),
                    },
                    span,
                ))
            }
            InfixRule::Send => {
                self.bump();
                let value = self.parse_expr_with(prec.below())?;
                let span = lhs.span.merge(&value.span);
                Ok(ast::Expr::new(
                    ast::ExprKind::Send {
                        chan: Box::new(lhs),
                        value: Box::new(value),
                    },
                    span,
                ))
            }
            InfixRule::Range { inclusive } => {
                let start = lhs.span.start;
                self.bump();
                let end = if self.at_range_end() {
                    Some(Box::new(self.parse_expr_with(prec.below())?))
                } else {
                    None
                };
                Ok(ast::Expr::new(
                    ast::ExprKind::Range {
                        start: Some(Box::new(lhs)),
                        end,
                        inclusive,
                    },
                    self.span_from(start),
                ))
            }
            InfixRule::Cast => {
                self.bump();
                let ty = self.parse_type()?;
                let span = lhs.span.merge(&ty.span);
                Ok(ast::Expr::new(
                    ast::ExprKind::Cast {
                        expr: Box::new(lhs),
                        ty,
                    },
                    span,
                ))
            }
            InfixRule::Call => self.parse_call_expr(lhs),
            InfixRule::Index => self.parse_index_expr(lhs),
            InfixRule::Field => self.parse_field_expr(lhs),
            InfixRule::Path => self.parse_path_expr(lhs),
            InfixRule::Try => {
                self.bump();
                let span = self.span_from(lhs.span.start);
                Ok(ast::Expr::new(ast::ExprKind::Try(Box::new(lhs)), span))
            }
            InfixRule::StructLiteral => self.parse_struct_expr(lhs),
        }
    }

    /// `{` after a name only opens a struct literal when it cannot be the
    /// body of an enclosing construct and what follows looks like a field
    /// list.
    fn at_struct_literal(&mut self, lhs: &ast::Expr) -> bool {
        if self.restricted(Restrictions::NO_STRUCT_LITERAL) {
            return false;
        }

        if !matches!(
            lhs.kind,
            ast::ExprKind::Name(_) | ast::ExprKind::Path { .. } | ast::ExprKind::Index { .. }
        ) {
            return false;
        }

        match self.kind_at(1) {
            TokenKind::RightCurly => true,
            TokenKind::Ident => peek_at!(self, 2, TokenKind::Colon),
            _ => false,
        }
    }

    /// Whether the token after `..` starts the range's upper bound.
    fn at_range_end(&mut self) -> bool {
        match self.kind() {
            TokenKind::LeftCurly => !self.restricted(Restrictions::NO_STRUCT_LITERAL),
            kind => prefix_rule(kind).is_some(),
        }
    }

    fn parse_range_to_expr(&mut self, inclusive: bool) -> ExprResult {
        let start = self.start_pos();
        self.bump();
        let end = if self.at_range_end() {
            Some(Box::new(self.parse_expr_with(Precedence::Range.below())?))
        } else {
            None
        };
        Ok(ast::Expr::new(
            ast::ExprKind::Range {
                start: None,
                end,
                inclusive,
            },
            self.span_from(start),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::{infix_rule, prefix_rule, InfixRule, Precedence, PrefixRule};
    use crate::ast::{token::TokenKind, BinaryOp};

    #[test]
    fn ladder_is_ordered() {
        let (_, assign) = infix_rule(TokenKind::Equals).unwrap();
        let (_, or) = infix_rule(TokenKind::DoublePipe).unwrap();
        let (_, and) = infix_rule(TokenKind::DoubleAmpersand).unwrap();
        let (_, cmp) = infix_rule(TokenKind::Lt).unwrap();
        let (_, add) = infix_rule(TokenKind::Plus).unwrap();
        let (_, mul) = infix_rule(TokenKind::Asterisk).unwrap();
        let (_, cast) = infix_rule(TokenKind::As).unwrap();
        let (_, call) = infix_rule(TokenKind::LeftParen).unwrap();
        assert!(assign < or && or < and && and < cmp);
        assert!(cmp < add && add < mul && mul < cast);
        assert!(cast < Precedence::Prefix && Precedence::Prefix < call);
    }

    #[test]
    fn below_steps_down_one_level() {
        assert_eq!(Precedence::Assignment.below(), Precedence::Lowest);
        assert_eq!(Precedence::Range.below(), Precedence::Assignment);
        assert_eq!(Precedence::Postfix.below(), Precedence::Prefix);
    }

    #[test]
    fn tokens_with_both_roles() {
        assert_eq!(prefix_rule(TokenKind::Pipe), Some(PrefixRule::Closure));
        assert_eq!(
            infix_rule(TokenKind::Pipe).map(|(r, _)| r),
            Some(InfixRule::Binary(BinaryOp::BitOr))
        );
        assert!(prefix_rule(TokenKind::LeftArrow).is_some());
        assert_eq!(
            infix_rule(TokenKind::LeftArrow),
            Some((InfixRule::Send, Precedence::Assignment))
        );
        assert_eq!(prefix_rule(TokenKind::Semi), None);
    }
}
