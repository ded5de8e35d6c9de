use crate::repl::{ReplError, Result};

/// One kind of navigation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
	/// Follow the pointer stored at the current address.
	Deref,
	/// Select an array or pointee element by number.
	Index,
	/// Select an element range; parsed but never evaluated.
	Slice,
	/// Select a named aggregate member.
	Member,
	/// Reinterpret the current address as another type.
	Cast,
}

/// One parsed operation of a navigation expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Op {
	/// Step kind.
	pub kind: OpKind,
	/// Member name, index number, slice start, or cast type text.
	pub operand: Box<str>,
	/// Slice end bound; empty for every other kind.
	pub operand2: Box<str>,
}

impl Op {
	/// Build an operand-less operation.
	pub fn bare(kind: OpKind) -> Self {
		Self {
			kind,
			operand: "".into(),
			operand2: "".into(),
		}
	}

	/// Build a single-operand operation.
	pub fn with(kind: OpKind, operand: &str) -> Self {
		Self {
			kind,
			operand: operand.into(),
			operand2: "".into(),
		}
	}

	/// Build a slice operation with both bounds.
	pub fn slice(start: &str, end: &str) -> Self {
		Self {
			kind: OpKind::Slice,
			operand: start.into(),
			operand2: end.into(),
		}
	}
}

/// Best-effort diagnostic recorded while parsing.
#[derive(Debug, Clone)]
pub struct ParseNote {
	/// Byte offset in the trimmed expression text.
	pub at: usize,
	/// Description of what was malformed.
	pub message: String,
}

/// Parsed navigation expression: a root operand plus ordered operations.
#[derive(Debug, Clone)]
pub struct NavExpr {
	/// The one bare identifier the expression starts from.
	pub root: Box<str>,
	/// Operations in evaluation order.
	pub ops: Vec<Op>,
	/// Diagnostics for malformed portions; the operation list is the valid prefix.
	pub notes: Vec<ParseNote>,
}

impl NavExpr {
	/// Parse member/index/deref/cast navigation syntax.
	///
	/// Parsing is best-effort: malformed tails record a [`ParseNote`] and the
	/// valid operation prefix is still returned. The only hard failures are an
	/// empty input and an input without a root identifier.
	pub fn parse(input: &str) -> Result<Self> {
		let trimmed = input.trim();
		if trimmed.is_empty() {
			return Err(ReplError::InvalidExpr {
				expr: input.to_owned(),
				reason: "empty expression",
			});
		}

		let mut parser = Parser {
			text: trimmed,
			bytes: trimmed.as_bytes(),
			pos: 0,
			notes: Vec::new(),
		};
		let (root, ops) = parser.parse_expr(false);

		let Some(root) = root else {
			return Err(ReplError::InvalidExpr {
				expr: input.to_owned(),
				reason: "no root identifier",
			});
		};

		Ok(Self {
			root,
			ops,
			notes: parser.notes,
		})
	}
}

fn precedence(kind: OpKind) -> u8 {
	match kind {
		OpKind::Deref | OpKind::Cast => 1,
		OpKind::Member | OpKind::Index | OpKind::Slice => 2,
	}
}

fn left_assoc(kind: OpKind) -> bool {
	matches!(kind, OpKind::Member | OpKind::Index | OpKind::Slice)
}

struct Parser<'a> {
	text: &'a str,
	bytes: &'a [u8],
	pos: usize,
	notes: Vec<ParseNote>,
}

impl Parser<'_> {
	/// Operator-precedence scan producing operations in evaluation order.
	///
	/// Pending operators flush to the output when a new operator of greater
	/// precedence arrives, or of equal precedence when the new operator is
	/// left-associative. Parenthesized sub-expressions are parsed recursively
	/// and their operation lists spliced inline.
	fn parse_expr(&mut self, stop_at_paren: bool) -> (Option<Box<str>>, Vec<Op>) {
		let mut out: Vec<Op> = Vec::new();
		let mut pending: Vec<Op> = Vec::new();
		let mut root: Option<Box<str>> = None;

		loop {
			self.skip_ws();
			let Some(byte) = self.peek() else { break };

			match byte {
				b')' if stop_at_paren => break,
				b'*' => {
					self.pos += 1;
					push_op(&mut out, &mut pending, Op::bare(OpKind::Deref));
				}
				b'.' => {
					self.pos += 1;
					self.skip_ws();
					let ident = self.lex_ident().to_owned();
					if ident.is_empty() {
						self.note("expected member name after '.'");
						break;
					}
					if ident == "cast" && self.peek_after_ws() == Some(b'(') {
						if let Some(op) = self.lex_cast_operand() {
							push_op(&mut out, &mut pending, op);
						}
					} else {
						push_op(&mut out, &mut pending, Op::with(OpKind::Member, &ident));
					}
				}
				b'[' => {
					if let Some(op) = self.lex_bracket() {
						push_op(&mut out, &mut pending, op);
					}
				}
				b'(' => {
					self.pos += 1;
					let (sub_root, sub_ops) = self.parse_expr(true);
					if self.peek() == Some(b')') {
						self.pos += 1;
					} else {
						self.note("unclosed '('");
					}
					out.extend(sub_ops);
					match (&root, sub_root) {
						(None, Some(sub)) => root = Some(sub),
						(None, None) => {}
						(Some(_), _) => self.note("unexpected parenthesized expression"),
					}
				}
				byte if byte.is_ascii_alphabetic() || byte == b'_' => {
					let ident = self.lex_ident().to_owned();
					if ident == "cast" && self.peek_after_ws() == Some(b'(') {
						if let Some(op) = self.lex_cast_operand() {
							push_op(&mut out, &mut pending, op);
						}
					} else if root.is_none() {
						root = Some(ident.into_boxed_str());
					} else {
						self.note("unexpected identifier");
					}
				}
				_ => {
					self.note("unexpected character");
					self.pos += 1;
				}
			}
		}

		while let Some(op) = pending.pop() {
			out.push(op);
		}
		(root, out)
	}

	/// Parse `[n]` or `[a..b]` starting at the opening bracket.
	fn lex_bracket(&mut self) -> Option<Op> {
		self.pos += 1;
		self.skip_ws();

		let start = self.lex_digits();
		if start.is_empty() {
			self.note("expected number in index");
			self.recover_past(b']');
			return None;
		}
		let start = start.to_owned();
		self.skip_ws();

		if self.bytes[self.pos..].starts_with(b"..") {
			self.pos += 2;
			self.skip_ws();
			let end = self.lex_digits();
			if end.is_empty() {
				self.note("expected number after '..'");
				self.recover_past(b']');
				return None;
			}
			let end = end.to_owned();
			self.skip_ws();
			if self.peek() != Some(b']') {
				self.note("expected ']' after slice bounds");
				self.recover_past(b']');
				return None;
			}
			self.pos += 1;
			return Some(Op::slice(&start, &end));
		}

		if self.peek() != Some(b']') {
			self.note("expected ']' after index");
			self.recover_past(b']');
			return None;
		}
		self.pos += 1;
		Some(Op::with(OpKind::Index, &start))
	}

	/// Capture the cast target text between parentheses, whitespace-stripped.
	fn lex_cast_operand(&mut self) -> Option<Op> {
		self.skip_ws();
		if self.peek() != Some(b'(') {
			self.note("expected '(' after cast");
			return None;
		}
		self.pos += 1;

		let start = self.pos;
		let mut depth = 1_usize;
		while let Some(byte) = self.peek() {
			match byte {
				b'(' => depth += 1,
				b')' => {
					depth -= 1;
					if depth == 0 {
						break;
					}
				}
				_ => {}
			}
			self.pos += 1;
		}
		if depth != 0 {
			self.note("unclosed cast parenthesis");
			return None;
		}

		let raw = &self.text[start..self.pos];
		self.pos += 1;
		let stripped: String = raw.chars().filter(|ch| !ch.is_whitespace()).collect();
		Some(Op::with(OpKind::Cast, &stripped))
	}

	fn lex_ident(&mut self) -> &str {
		let start = self.pos;
		while let Some(byte) = self.peek() {
			if byte.is_ascii_alphanumeric() || byte == b'_' {
				self.pos += 1;
			} else {
				break;
			}
		}
		&self.text[start..self.pos]
	}

	fn lex_digits(&mut self) -> &str {
		let start = self.pos;
		while let Some(byte) = self.peek() {
			if byte.is_ascii_digit() {
				self.pos += 1;
			} else {
				break;
			}
		}
		&self.text[start..self.pos]
	}

	fn recover_past(&mut self, delim: u8) {
		while let Some(byte) = self.peek() {
			self.pos += 1;
			if byte == delim {
				break;
			}
		}
	}

	fn skip_ws(&mut self) {
		while let Some(byte) = self.peek() {
			if byte.is_ascii_whitespace() {
				self.pos += 1;
			} else {
				break;
			}
		}
	}

	fn peek(&self) -> Option<u8> {
		self.bytes.get(self.pos).copied()
	}

	fn peek_after_ws(&self) -> Option<u8> {
		let mut idx = self.pos;
		while idx < self.bytes.len() && self.bytes[idx].is_ascii_whitespace() {
			idx += 1;
		}
		self.bytes.get(idx).copied()
	}

	fn note(&mut self, message: &str) {
		self.notes.push(ParseNote {
			at: self.pos,
			message: message.to_owned(),
		});
	}
}

fn push_op(out: &mut Vec<Op>, pending: &mut Vec<Op>, op: Op) {
	let prec = precedence(op.kind);
	let left = left_assoc(op.kind);
	while let Some(top) = pending.last() {
		let top_prec = precedence(top.kind);
		if top_prec > prec || (left && top_prec == prec) {
			out.push(pending.pop().expect("pending operator present"));
		} else {
			break;
		}
	}
	pending.push(op);
}

#[cfg(test)]
mod tests;
