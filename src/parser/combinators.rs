use std::cell::OnceCell;
use std::ops::{Add, BitOr, Mul, Shr, Sub};
use std::rc::{Rc, Weak};

use crate::span::Span;

use super::state::{ParseError, ParseResult, ParseState, Parser};

type ParserFn<T> = Rc<dyn Fn(&mut ParseState) -> ParseResult<T>>;

// === Boxed Parser for type erasure ===

/// A cloneable, type-erased parser.
///
/// Every boxed parser is an attempt: when it fails, the scanner is restored
/// to where the attempt started, so no partial consumption escapes a failure.
pub struct BoxedParser<T> {
    parser: ParserFn<T>,
}

impl<T> Clone for BoxedParser<T> {
    fn clone(&self) -> Self {
        BoxedParser {
            parser: Rc::clone(&self.parser),
        }
    }
}

impl<T: 'static> BoxedParser<T> {
    pub fn new<P: Parser<T> + 'static>(parser: P) -> Self {
        BoxedParser {
            parser: Rc::new(move |state: &mut ParseState| parser.parse(state)),
        }
    }
}

impl<T> Parser<T> for BoxedParser<T> {
    fn parse(&self, state: &mut ParseState) -> ParseResult<T> {
        let pos = state.position();
        let result = (self.parser)(state);
        if result.is_err() {
            state.restore(pos);
        }
        result
    }
}

// === Combinators as methods ===

impl<T: 'static> BoxedParser<T> {
    /// Sequence: parse self then other, return (T, U)
    pub fn seq<U: 'static>(self, other: BoxedParser<U>) -> BoxedParser<(T, U)> {
        BoxedParser::new(move |state: &mut ParseState| {
            let a = self.parse(state)?;
            let b = other.parse(state)?;
            Ok((a, b))
        })
    }

    /// Keep left: parse self then other, discard other's result
    pub fn skip<U: 'static>(self, other: BoxedParser<U>) -> BoxedParser<T> {
        BoxedParser::new(move |state: &mut ParseState| {
            let a = self.parse(state)?;
            other.parse(state)?;
            Ok(a)
        })
    }

    /// Keep right: parse self then other, discard self's result
    pub fn skip_left<U: 'static>(self, other: BoxedParser<U>) -> BoxedParser<U> {
        BoxedParser::new(move |state: &mut ParseState| {
            self.parse(state)?;
            other.parse(state)
        })
    }

    /// Map: transform result
    pub fn map<U: 'static, F: Fn(T) -> U + 'static>(self, f: F) -> BoxedParser<U> {
        BoxedParser::new(move |state: &mut ParseState| {
            let a = self.parse(state)?;
            Ok(f(a))
        })
    }

    /// Choice: try self, if fails try other
    pub fn or(self, other: BoxedParser<T>) -> BoxedParser<T> {
        BoxedParser::new(move |state: &mut ParseState| match self.parse(state) {
            Ok(a) => Ok(a),
            // Both failures are already recorded in state
            Err(first) => other.parse(state).map_err(|second| further(first, second)),
        })
    }

    /// Predicate filter: a rejected value fails like a parse failure would
    pub fn filter<F: Fn(&T) -> bool + 'static>(
        self,
        predicate: F,
        expected: &'static str,
    ) -> BoxedParser<T> {
        self.filter_map(
            move |value| if predicate(&value) { Some(value) } else { None },
            expected,
        )
    }

    /// Map with a check; `None` fails at the start of the parsed value
    pub fn filter_map<U: 'static, F: Fn(T) -> Option<U> + 'static>(
        self,
        f: F,
        expected: &'static str,
    ) -> BoxedParser<U> {
        BoxedParser::new(move |state: &mut ParseState| {
            state.skip_trivia()?;
            let start = state.offset();
            let value = self.parse(state)?;
            match f(value) {
                Some(mapped) => Ok(mapped),
                None => {
                    let err = ParseError::new("rejected input")
                        .expected(expected)
                        .at(start);
                    state.record_error(&err);
                    Err(err)
                }
            }
        })
    }

    /// Add a label to this parser for better error messages.
    ///
    /// The label only replaces the expectations when the parser failed
    /// without getting past its first character; deeper failures are kept.
    pub fn label(self, name: &'static str) -> BoxedParser<T> {
        BoxedParser::new(move |state: &mut ParseState| {
            state.skip_trivia()?;
            let start = state.offset();
            let outer = state.take_furthest();
            let result = self.parse(state);
            let inner = state.take_furthest();
            state.merge_furthest(outer);

            match result {
                Ok(value) => {
                    state.merge_furthest(inner);
                    Ok(value)
                }
                Err(err) => match inner {
                    Some(failure) if failure.offset > start => {
                        state.merge_furthest(Some(failure));
                        Err(err)
                    }
                    _ => {
                        let err = ParseError::new(err.message).expected(name).at(start);
                        state.record_error(&err);
                        Err(err)
                    }
                },
            }
        })
    }

    /// Quiet: failures inside never count as furthest failures
    pub fn quiet(self) -> BoxedParser<T> {
        BoxedParser::new(move |state: &mut ParseState| {
            state.enter_silent();
            let result = self.parse(state);
            state.leave_silent();
            result
        })
    }

    /// Atomic: no trivia is skipped inside the wrapped parser
    pub fn atomic(self) -> BoxedParser<T> {
        BoxedParser::new(move |state: &mut ParseState| {
            state.skip_trivia()?;
            let previous = state.set_skip_trivia(false);
            let result = self.parse(state);
            state.set_skip_trivia(previous);
            result
        })
    }

    /// Nested: the wrapped parser counts as one more level of nesting
    pub fn nested(self) -> BoxedParser<T> {
        BoxedParser::new(move |state: &mut ParseState| {
            state.descend()?;
            let result = self.parse(state);
            state.ascend();
            result
        })
    }
}

fn further(a: ParseError, b: ParseError) -> ParseError {
    if a.offset > b.offset { a } else { b }
}

// === Operator Overloading ===

/// `+` for sequence: A + B -> (A, B)
impl<T: 'static, U: 'static> Add<BoxedParser<U>> for BoxedParser<T> {
    type Output = BoxedParser<(T, U)>;

    fn add(self, rhs: BoxedParser<U>) -> Self::Output {
        self.seq(rhs)
    }
}

/// `-` for keep left: A - B -> A (parse B, discard result)
impl<T: 'static, U: 'static> Sub<BoxedParser<U>> for BoxedParser<T> {
    type Output = BoxedParser<T>;

    fn sub(self, rhs: BoxedParser<U>) -> Self::Output {
        self.skip(rhs)
    }
}

/// `*` for keep right: A * B -> B (parse A, discard result)
impl<T: 'static, U: 'static> Mul<BoxedParser<U>> for BoxedParser<T> {
    type Output = BoxedParser<U>;

    fn mul(self, rhs: BoxedParser<U>) -> Self::Output {
        self.skip_left(rhs)
    }
}

/// `|` for choice: A | B -> A or B
impl<T: 'static> BitOr<BoxedParser<T>> for BoxedParser<T> {
    type Output = BoxedParser<T>;

    fn bitor(self, rhs: BoxedParser<T>) -> Self::Output {
        self.or(rhs)
    }
}

/// `>>` for map: A >> fn -> B
impl<T: 'static, U: 'static, F: Fn(T) -> U + 'static> Shr<F> for BoxedParser<T> {
    type Output = BoxedParser<U>;

    fn shr(self, f: F) -> Self::Output {
        self.map(f)
    }
}

// === Primitive Parsers ===

/// Match an exact piece of text
pub fn literal(text: &'static str) -> BoxedParser<&'static str> {
    BoxedParser::new(move |state: &mut ParseState| {
        state.skip_trivia()?;
        if state.remaining().starts_with(text) {
            state.advance_by(text.len());
            Ok(text)
        } else if state.has_next() {
            Err(state.fail("unexpected input", &format!("`{text}`")))
        } else {
            Err(state.fail("unexpected end of input", &format!("`{text}`")))
        }
    })
}

/// Match a single character accepted by `predicate`
pub fn satisfy<F: Fn(char) -> bool + 'static>(
    predicate: F,
    expected: &'static str,
) -> BoxedParser<char> {
    BoxedParser::new(move |state: &mut ParseState| {
        state.skip_trivia()?;
        match state.peek() {
            Some(c) if predicate(c) => {
                state.advance();
                Ok(c)
            }
            Some(_) => Err(state.fail("unexpected character", expected)),
            None => Err(state.fail("unexpected end of input", expected)),
        }
    })
}

/// Succeed only when all input (apart from trailing trivia) is consumed
pub fn end_of_input() -> BoxedParser<()> {
    BoxedParser::new(|state: &mut ParseState| {
        state.skip_trivia()?;
        if state.has_next() {
            Err(state.fail("unexpected input", "end of input"))
        } else {
            Ok(())
        }
    })
}

/// Return the source text matched by `parser` instead of its value
pub fn recognize<T: 'static>(parser: BoxedParser<T>) -> BoxedParser<String> {
    spanned(parser) >> |(_, text)| text
}

/// Pair the parsed value with the text it covers and its byte span
fn spanned<T: 'static>(parser: BoxedParser<T>) -> BoxedParser<((T, Span), String)> {
    BoxedParser::new(move |state: &mut ParseState| {
        state.skip_trivia()?;
        let start = state.offset();
        let value = parser.parse(state)?;
        let span = state.span_from(start);
        let text = state.source()[span.start..span.end].to_string();
        Ok(((value, span), text))
    })
}

/// Like [`recognize`], but also returns the byte span of the text
pub fn recognize_spanned<T: 'static>(parser: BoxedParser<T>) -> BoxedParser<(String, Span)> {
    spanned(parser) >> |((_, span), text)| (text, span)
}

/// Pair the parsed value with its byte span
pub fn with_span<T: 'static>(parser: BoxedParser<T>) -> BoxedParser<(T, Span)> {
    spanned(parser) >> |(value, _)| value
}

/// Parse zero or more occurrences
pub fn many<T: 'static>(parser: BoxedParser<T>) -> BoxedParser<Vec<T>> {
    BoxedParser::new(move |state: &mut ParseState| {
        let mut results = Vec::new();
        loop {
            let before = state.offset();
            match parser.parse(state) {
                Ok(item) => {
                    results.push(item);
                    // An item that consumed nothing would repeat forever
                    if state.offset() == before {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
        Ok(results)
    })
}

/// Parse one or more occurrences
pub fn many1<T: 'static>(parser: BoxedParser<T>) -> BoxedParser<Vec<T>> {
    (parser.clone() + many(parser)) >> |(first, rest)| {
        let mut results = vec![first];
        results.extend(rest);
        results
    }
}

/// Parse one or more occurrences separated by `separator`
pub fn sep_by<T: 'static, S: 'static>(
    parser: BoxedParser<T>,
    separator: BoxedParser<S>,
) -> BoxedParser<Vec<T>> {
    (parser.clone() + many(separator * parser)) >> |(first, rest)| {
        let mut results = vec![first];
        results.extend(rest);
        results
    }
}

/// Optional: parse zero or one
pub fn optional<T: 'static>(parser: BoxedParser<T>) -> BoxedParser<Option<T>> {
    BoxedParser::new(move |state: &mut ParseState| Ok(parser.parse(state).ok()))
}

/// Ordered choice over any number of alternatives; the first success wins
pub fn choice<T: 'static>(parsers: Vec<BoxedParser<T>>) -> BoxedParser<T> {
    BoxedParser::new(move |state: &mut ParseState| {
        let mut error: Option<ParseError> = None;
        for parser in &parsers {
            match parser.parse(state) {
                Ok(value) => return Ok(value),
                Err(err) => {
                    error = Some(match error {
                        Some(previous) => further(previous, err),
                        None => err,
                    })
                }
            }
        }
        Err(error.unwrap_or_else(|| ParseError::new("no alternatives").at(state.offset())))
    })
}

/// Positive lookahead: succeed iff `parser` would succeed here, consuming nothing
pub fn followed_by<T: 'static>(parser: BoxedParser<T>) -> BoxedParser<()> {
    BoxedParser::new(move |state: &mut ParseState| {
        let pos = state.position();
        state.enter_silent();
        let result = parser.parse(state);
        state.leave_silent();
        state.restore(pos);
        result.map(|_| ())
    })
}

/// Negative lookahead: succeed iff `parser` would fail here, consuming nothing
pub fn not_followed_by<T: 'static>(parser: BoxedParser<T>) -> BoxedParser<()> {
    BoxedParser::new(move |state: &mut ParseState| {
        let pos = state.position();
        state.enter_silent();
        let result = parser.parse(state);
        state.leave_silent();
        state.restore(pos);
        match result {
            Ok(_) => Err(ParseError::new("unexpected input").at(state.offset())),
            Err(_) => Ok(()),
        }
    })
}

// === Lazy references ===

/// A named grammar rule that can be referenced before it is defined.
///
/// Declare every rule first, hand out [`Rule::parser`] references while
/// building the others, then [`Rule::define`] each body. References are weak:
/// whoever owns the `Rule` keeps the rule graph alive.
pub struct Rule<T> {
    name: &'static str,
    cell: Rc<OnceCell<BoxedParser<T>>>,
}

impl<T: 'static> Rule<T> {
    pub fn declare(name: &'static str) -> Self {
        Self {
            name,
            cell: Rc::new(OnceCell::new()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Fill in the rule's body. A rule is defined exactly once.
    pub fn define(&self, parser: BoxedParser<T>) {
        let fresh = self.cell.set(parser).is_ok();
        debug_assert!(fresh, "rule `{}` defined twice", self.name);
    }

    /// A parser that resolves to the rule's body at parse time
    pub fn parser(&self) -> BoxedParser<T> {
        let cell: Weak<OnceCell<BoxedParser<T>>> = Rc::downgrade(&self.cell);
        let name = self.name;
        BoxedParser::new(move |state: &mut ParseState| {
            let body = cell
                .upgrade()
                .and_then(|cell| cell.get().cloned())
                .ok_or_else(|| {
                    ParseError::new(format!("rule `{name}` used before it was defined"))
                        .at(state.offset())
                })?;
            body.parse(state)
        })
    }
}
