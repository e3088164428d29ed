use super::error::PhyloError;
use super::node::NodeId;
use super::tree::{Outgroup, Tree};
use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, digit1, multispace0, one_of},
    combinator::{all_consuming, map_res, opt, recognize},
    error::{context, ContextError, ErrorKind, FromExternalError, ParseError},
    IResult, Offset, Parser,
};

// ================================================================================================
// Error Handling Structures
// ================================================================================================

#[derive(Clone, Debug, PartialEq)]
pub enum DetailedErrorKind {
    Context(&'static str),
    Nom(ErrorKind),
}

/// A custom error type for nom that accumulates context and error kinds.
#[derive(Clone, Debug, PartialEq)]
pub struct DetailedError<'a> {
    pub errors: Vec<(&'a str, DetailedErrorKind)>,
}

impl<'a> ParseError<&'a str> for DetailedError<'a> {
    fn from_error_kind(input: &'a str, kind: ErrorKind) -> Self {
        DetailedError {
            errors: vec![(input, DetailedErrorKind::Nom(kind))],
        }
    }

    fn append(input: &'a str, kind: ErrorKind, mut other: Self) -> Self {
        other.errors.push((input, DetailedErrorKind::Nom(kind)));
        other
    }
}

impl<'a> ContextError<&'a str> for DetailedError<'a> {
    fn add_context(input: &'a str, ctx: &'static str, mut other: Self) -> Self {
        other.errors.push((input, DetailedErrorKind::Context(ctx)));
        other
    }
}

impl<'a, E> FromExternalError<&'a str, E> for DetailedError<'a> {
    fn from_external_error(input: &'a str, kind: ErrorKind, _e: E) -> Self {
        DetailedError {
            errors: vec![(input, DetailedErrorKind::Nom(kind))],
        }
    }
}

/// Build a `ParseError` pointing at `at`, a slice of `input`.
fn make_tree_error(input: &str, at: &str, message: String) -> PhyloError {
    let offset = input.offset(at);

    let prefix = &input[..offset];
    let line = prefix.chars().filter(|&c| c == '\n').count() + 1;
    let last_newline = prefix.rfind('\n').map(|p| p + 1).unwrap_or(0);
    let column = offset - last_newline + 1;

    PhyloError::ParseError {
        message,
        line,
        column,
        snippet: input[offset..].chars().take(50).collect(),
    }
}

fn nom_error(input: &str, e: nom::Err<DetailedError>) -> PhyloError {
    match e {
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            let at = e.errors.first().map(|(rest, _)| *rest).unwrap_or(input);

            let mut msg = String::new();
            for (_, kind) in e.errors.iter().rev() {
                match kind {
                    DetailedErrorKind::Context(ctx) => {
                        msg.push_str(&format!("while parsing {}:\n", ctx));
                    }
                    DetailedErrorKind::Nom(k) => {
                        msg.push_str(&format!("  error: {:?}\n", k));
                    }
                }
            }
            make_tree_error(input, at, msg)
        }
        nom::Err::Incomplete(_) => {
            make_tree_error(input, &input[input.len()..], "incomplete input".to_string())
        }
    }
}

// ================================================================================================
// Lexer
// ================================================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token<'a> {
    Open,
    Close,
    Comma,
    Colon,
    Semicolon,
    /// `name_state`; the name is empty on internal nodes
    Label { name: &'a str, state: &'a str },
    /// A time or a state
    Word(&'a str),
}

#[derive(Debug, Clone, Copy)]
struct Lexeme<'a> {
    token: Token<'a>,
    /// Slice of the input line, for error positions
    text: &'a str,
}

fn parse_punct(input: &str) -> IResult<&str, Lexeme<'_>, DetailedError<'_>> {
    let (rest, c) = one_of::<&str, _, DetailedError<'_>>("(),:;").parse(input)?;
    let token = match c {
        '(' => Token::Open,
        ')' => Token::Close,
        ',' => Token::Comma,
        ':' => Token::Colon,
        _ => Token::Semicolon,
    };
    Ok((
        rest,
        Lexeme {
            token,
            text: &input[..1],
        },
    ))
}

// Names may hold underscores themselves, so the state follows the last one:
// `Homo_sapiens_A` is the node `Homo_sapiens` in state `A`.
fn parse_word(input: &str) -> IResult<&str, Lexeme<'_>, DetailedError<'_>> {
    let (rest, text) = take_while1::<_, &str, DetailedError<'_>>(|c: char| {
        !"(),:;".contains(c) && !c.is_whitespace()
    })
    .parse(input)?;
    let token = match text.rfind('_') {
        Some(p) => Token::Label {
            name: &text[..p],
            state: &text[p + 1..],
        },
        None => Token::Word(text),
    };
    Ok((rest, Lexeme { token, text }))
}

fn tokenize(line: &str) -> Result<Vec<Lexeme<'_>>, PhyloError> {
    let mut lexemes = Vec::new();
    let mut rest = line;

    loop {
        let (r, _) = multispace0::<&str, DetailedError<'_>>(rest).map_err(|e| nom_error(line, e))?;
        if r.is_empty() {
            break;
        }
        let (r, lexeme) = context("token", alt((parse_punct, parse_word)))
            .parse(r)
            .map_err(|e| nom_error(line, e))?;
        lexemes.push(lexeme);
        rest = r;
    }

    Ok(lexemes)
}

// Non-negative decimal, scientific notation allowed (e.g. 5e-05)
fn parse_time(input: &str) -> IResult<&str, f64, DetailedError<'_>> {
    context(
        "time",
        all_consuming(map_res(
            recognize((
                digit1,
                opt((char('.'), digit1)),
                opt((one_of("eE"), opt(one_of("+-")), digit1)),
            )),
            |s: &str| s.parse::<f64>(),
        )),
    )
    .parse(input)
}

// ================================================================================================
// State machine
// ================================================================================================

/// What the last accepted token was, when a `:` or a delimiter may follow.
#[derive(Debug, Clone, Copy, PartialEq)]
enum After {
    Label,
    Time,
    PathState,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Expect {
    /// Start of a node: `(` or a label. Once a clade's `)` is read, only its label may follow.
    AwaitName { after_clade: bool },
    /// A number after `:`; `first` marks the node's own time
    AwaitTime { first: bool },
    /// A state after a time
    AwaitState,
    AwaitDelimiter(After),
    Done,
}

/// Builds one tree from one mapping line.
///
/// `(` and `,` push a placeholder node; a label pops the stack top, names it and hangs it
/// under the new top. Placeholders are created in preorder, so node IDs are preorder ranks.
struct MappingParser<'a> {
    line: &'a str,
    tree: Tree,
    stack: Vec<NodeId>,
    expect: Expect,
    /// Node receiving times and states
    current: Option<NodeId>,
    /// A state waiting for the next token: `:` makes it an event, a delimiter a closing state
    pending: Option<char>,
    /// Closing states restate the parent's state; checked once the parents are known
    closings: Vec<(NodeId, char)>,
}

impl<'a> MappingParser<'a> {
    fn new(line: &'a str) -> Self {
        let mut tree = Tree::new();
        let root = tree.add_node();
        Self {
            line,
            tree,
            stack: vec![root],
            expect: Expect::AwaitName { after_clade: false },
            current: None,
            pending: None,
            closings: Vec::new(),
        }
    }

    fn error(&self, at: &str, message: impl Into<String>) -> PhyloError {
        make_tree_error(self.line, at, message.into())
    }

    fn step(&mut self, lexeme: Lexeme<'a>) -> Result<(), PhyloError> {
        match (self.expect, lexeme.token) {
            (Expect::Done, _) => Err(self.error(lexeme.text, "unexpected input after ';'")),

            (Expect::AwaitName { after_clade: false }, Token::Open) => {
                self.stack.push(self.tree.add_node());
                Ok(())
            }
            (Expect::AwaitName { after_clade }, Token::Label { name, state }) => {
                self.close_node(lexeme, name, state, after_clade)
            }
            (Expect::AwaitName { .. }, Token::Word(_)) => Err(self.error(
                lexeme.text,
                "node label must be written as name_state",
            )),
            (Expect::AwaitName { .. }, _) => {
                Err(self.error(lexeme.text, "expected '(' or a node label"))
            }

            (Expect::AwaitTime { first }, Token::Word(text)) => {
                let (_, time) = parse_time(text).map_err(|e| nom_error(self.line, e))?;
                let node = self.current_node(lexeme)?;
                if first {
                    self.tree.nodes[node].time = Some(time);
                } else {
                    let state = self
                        .pending
                        .take()
                        .ok_or_else(|| self.error(lexeme.text, "time without a state"))?;
                    self.tree.nodes[node].events.push((state, time));
                }
                self.expect = Expect::AwaitDelimiter(After::Time);
                Ok(())
            }
            (Expect::AwaitTime { .. }, _) => {
                Err(self.error(lexeme.text, "expected a numeric time"))
            }

            (Expect::AwaitState, Token::Word(text)) => {
                self.pending = Some(self.parse_state(text)?);
                self.expect = Expect::AwaitDelimiter(After::PathState);
                Ok(())
            }
            (Expect::AwaitState, _) => Err(self.error(lexeme.text, "expected a state")),

            (Expect::AwaitDelimiter(after), Token::Colon) => {
                self.expect = match after {
                    After::Label => Expect::AwaitTime { first: true },
                    After::Time => Expect::AwaitState,
                    After::PathState => Expect::AwaitTime { first: false },
                };
                Ok(())
            }
            (Expect::AwaitDelimiter(after), Token::Comma | Token::Close | Token::Semicolon) => {
                if after == After::PathState {
                    let node = self.current_node(lexeme)?;
                    if let Some(state) = self.pending.take() {
                        self.closings.push((node, state));
                    }
                }
                self.delimit(lexeme)
            }
            (Expect::AwaitDelimiter(_), _) => {
                Err(self.error(lexeme.text, "expected ':' or a delimiter"))
            }
        }
    }

    fn current_node(&self, lexeme: Lexeme) -> Result<NodeId, PhyloError> {
        self.current
            .ok_or_else(|| self.error(lexeme.text, "value before any node label"))
    }

    fn parse_state(&self, text: &'a str) -> Result<char, PhyloError> {
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            (None, _) => Err(self.error(text, "empty state")),
            _ => Err(self.error(text, "state must be a single character")),
        }
    }

    fn close_node(
        &mut self,
        lexeme: Lexeme<'a>,
        name: &'a str,
        state: &'a str,
        after_clade: bool,
    ) -> Result<(), PhyloError> {
        if !after_clade && name.is_empty() {
            return Err(self.error(lexeme.text, "leaf without a name"));
        }
        let state = self.parse_state(state)?;
        let id = self
            .stack
            .pop()
            .ok_or_else(|| self.error(lexeme.text, "unbalanced brackets"))?;

        {
            let node = &mut self.tree.nodes[id];
            if !name.is_empty() {
                node.set_name(name);
            }
            node.state = Some(state);
        }

        match self.stack.last() {
            Some(&parent) => self
                .tree
                .add_child(parent, id)
                .map_err(PhyloError::LogicError)?,
            None => self.tree.set_root(id),
        }

        self.current = Some(id);
        self.expect = Expect::AwaitDelimiter(After::Label);
        Ok(())
    }

    fn delimit(&mut self, lexeme: Lexeme<'a>) -> Result<(), PhyloError> {
        match lexeme.token {
            Token::Comma => {
                if self.stack.is_empty() {
                    return Err(self.error(lexeme.text, "',' outside of any clade"));
                }
                self.stack.push(self.tree.add_node());
                self.expect = Expect::AwaitName { after_clade: false };
            }
            Token::Close => {
                if self.stack.is_empty() {
                    return Err(self.error(lexeme.text, "unbalanced brackets: extra ')'"));
                }
                self.expect = Expect::AwaitName { after_clade: true };
            }
            _ => {
                if !self.stack.is_empty() {
                    return Err(self.error(lexeme.text, "unbalanced brackets: missing ')'"));
                }
                self.expect = Expect::Done;
            }
        }
        self.current = None;
        Ok(())
    }

    fn finish(mut self) -> Result<Tree, PhyloError> {
        if self.expect != Expect::Done {
            let end = &self.line[self.line.len()..];
            let message = if self.stack.is_empty() {
                "missing ';'"
            } else {
                "unbalanced brackets: missing ')'"
            };
            return Err(self.error(end, message));
        }

        self.tree.finish();

        for &(id, state) in &self.closings {
            let node = &self.tree.nodes[id];
            let parent_state = node.parent.and_then(|p| self.tree.nodes[p].state);
            if parent_state != Some(state) {
                log::warn!(
                    "Closing state {} of node {} disagrees with parent state {:?}",
                    state,
                    node.num,
                    parent_state
                );
            }
        }

        Ok(self.tree)
    }
}

fn parse_mapping(line: &str) -> Result<Tree, PhyloError> {
    let mut parser = MappingParser::new(line);
    for lexeme in tokenize(line)? {
        parser.step(lexeme)?;
    }
    parser.finish()
}

impl Tree {
    /// Parse one stochastic-mapping line into a numbered tree with event paths.
    ///
    /// # Example
    /// ```
    /// use pbsub::libs::phylo::tree::Tree;
    ///
    /// let tree = Tree::from_mapping("(A_A:0.1:C:0.5:C,B_C:0.6:C)_C;").unwrap();
    /// assert_eq!(tree.n_leaves(), 2);
    /// assert_eq!(tree.n_branches(), 2);
    ///
    /// // Times must be numbers
    /// assert!(Tree::from_mapping("(A_A:x:C,B_C:0.6:C)_C;").is_err());
    /// ```
    pub fn from_mapping(line: &str) -> Result<Self, PhyloError> {
        parse_mapping(line)
    }

    /// Parse, then remove the outgroup subtree of an unrooted topology.
    pub fn from_mapping_with_outgroup(
        line: &str,
        outgroup: Option<&Outgroup>,
    ) -> Result<Self, PhyloError> {
        let mut tree = parse_mapping(line)?;
        if let Some(outgroup) = outgroup {
            tree.prune_outgroup(outgroup)?;
        }
        Ok(tree)
    }
}
