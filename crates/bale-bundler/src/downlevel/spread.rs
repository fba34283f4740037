//! Object spread lowered to `Object.assign`.
//!
//! `{ a, ...b, c: 1 }` becomes `Object.assign({ a }, b, { c: 1 })`. Properties
//! are assigned rather than defined, so setters on the target run.

use oxc_ast::ast::{Argument, Expression, ObjectPropertyKind, Program};
use oxc_ast::{AstBuilder, NONE};
use oxc_ast_visit::{VisitMut, walk_mut};
use oxc_span::SPAN;

/// Rewrite every object literal holding a spread. Returns how many were rewritten.
pub(super) fn spread_to_assign<'a>(ast: AstBuilder<'a>, program: &mut Program<'a>) -> usize {
    let mut pass = SpreadToAssign { ast, rewritten: 0 };
    pass.visit_program(program);
    pass.rewritten
}

struct SpreadToAssign<'a> {
    ast: AstBuilder<'a>,
    rewritten: usize,
}

impl<'a> VisitMut<'a> for SpreadToAssign<'a> {
    fn visit_expression(&mut self, expr: &mut Expression<'a>) {
        // Inner literals first, so nested spreads end up as plain arguments
        walk_mut::walk_expression(self, expr);

        let Expression::ObjectExpression(object) = expr else {
            return;
        };
        if !object
            .properties
            .iter()
            .any(|property| matches!(property, ObjectPropertyKind::SpreadProperty(_)))
        {
            return;
        }

        let span = object.span;
        let properties = std::mem::replace(&mut object.properties, self.ast.vec());
        let mut arguments = self.ast.vec();
        let mut pending = self.ast.vec();

        for (index, property) in properties.into_iter().enumerate() {
            match property {
                ObjectPropertyKind::SpreadProperty(spread) => {
                    // The target is always a fresh literal, never a spread source
                    if index == 0 || !pending.is_empty() {
                        let literal = std::mem::replace(&mut pending, self.ast.vec());
                        arguments.push(Argument::from(self.ast.expression_object(SPAN, literal)));
                    }
                    arguments.push(Argument::from(spread.unbox().argument));
                }
                property => pending.push(property),
            }
        }
        if !pending.is_empty() {
            arguments.push(Argument::from(self.ast.expression_object(SPAN, pending)));
        }

        let callee = Expression::from(self.ast.member_expression_static(
            SPAN,
            self.ast.expression_identifier(SPAN, "Object"),
            self.ast.identifier_name(SPAN, "assign"),
            false,
        ));
        *expr = self.ast.expression_call(span, callee, NONE, arguments, false);
        self.rewritten += 1;
    }
}
