//! A `nom`-based scanner and expression parser for the template dialect
//!
//! Source text is split into literal text and `<% ... %>` tags. Tags are
//! parsed into a small tree of [`Node`]s; expressions inside them are
//! restricted to literals, variable paths, `import(..)`, comparisons and
//! boolean operators.

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_until, take_while},
    character::complete::{anychar, char, digit1, multispace0, none_of, satisfy},
    combinator::{cut, map, map_opt, map_res, not, opt, recognize, rest, value, verify},
    multi::{fold_many0, many0, many0_count},
    sequence::{delimited, pair, preceded, terminated},
};

/// A parsed template
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Text(String),
    Output(Expr),
    If {
        branches: Vec<(Expr, Vec<Node>)>,
        otherwise: Vec<Node>,
    },
    For {
        var: String,
        iter: Expr,
        body: Vec<Node>,
    },
}

/// Template expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Str(String),
    Bool(bool),
    Nil,
    /// Dotted variable path, e.g. `book.title`
    Var(Vec<String>),
    Import(Box<Expr>),
    Not(Box<Expr>),
    Eq(Box<Expr>, Box<Expr>),
    Ne(Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

/// Parse failure with the 1-based line it occurred on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub line: usize,
    pub message: String,
}

impl SyntaxError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

type ParseResult<T> = Result<T, SyntaxError>;

/// Raw piece of source before block structure is applied
#[derive(Debug)]
enum Segment<'a> {
    Text(String),
    Output(&'a str),
    Statement(&'a str),
}

/// Parse template source into a node list
pub fn parse(source: &str) -> ParseResult<Vec<Node>> {
    let segments = scan(source)?;
    let mut builder = TreeBuilder::default();

    for (line, segment) in segments {
        match segment {
            Segment::Text(text) => builder.push(Node::Text(text)),
            Segment::Output(code) => builder.push(Node::Output(parse_expression(code, line)?)),
            Segment::Statement(code) => builder.statement(code, line)?,
        }
    }

    builder.finish()
}

// --- Tag scanner ---

/// Split source into text and tag segments, tagging each with its line
fn scan(source: &str) -> ParseResult<Vec<(usize, Segment<'_>)>> {
    let mut segments = Vec::new();
    let mut text = String::new();
    let mut text_line = 1;
    let mut line = 1;
    let mut input = source;

    while !input.is_empty() {
        if let Ok((after, literal)) = alt((literal_text, escaped_open)).parse(input) {
            if text.is_empty() {
                text_line = line;
            }
            text.push_str(literal);
            line += consumed(input, after).matches('\n').count();
            input = after;
            continue;
        }

        if !text.is_empty() {
            segments.push((text_line, Segment::Text(std::mem::take(&mut text))));
        }

        let (after, segment) = template_tag(input)
            .map_err(|_| SyntaxError::new(line, "unterminated tag, expected '%>'"))?;
        if let Some(segment) = segment {
            segments.push((line, segment));
        }
        line += consumed(input, after).matches('\n').count();
        input = after;
    }

    if !text.is_empty() {
        segments.push((text_line, Segment::Text(text)));
    }
    Ok(segments)
}

fn consumed<'a>(before: &'a str, after: &'a str) -> &'a str {
    &before[..before.len() - after.len()]
}

/// Text up to the next tag opener, or the rest of the source
fn literal_text(input: &str) -> IResult<&str, &str> {
    verify(alt((take_until("<%"), rest)), |s: &str| !s.is_empty()).parse(input)
}

/// `<%%` stands for a literal `<%`
fn escaped_open(input: &str) -> IResult<&str, &str> {
    value("<%", tag("<%%")).parse(input)
}

/// One tag, plus the newline after it when the tag closes with `-%>`
fn template_tag(input: &str) -> IResult<&str, Option<Segment<'_>>> {
    let (input, (inner, segment)) = alt((
        map(comment_tag, |inner: &str| (inner, None)),
        map(code_tag, |inner: &str| (inner, Some(classify(inner)))),
    ))
    .parse(input)?;

    if inner.ends_with('-') {
        let (input, _) = opt(line_break).parse(input)?;
        return Ok((input, segment));
    }
    Ok((input, segment))
}

/// Comments are free text and end at the first `%>`
fn comment_tag(input: &str) -> IResult<&str, &str> {
    delimited(tag("<%#"), take_until("%>"), tag("%>")).parse(input)
}

fn code_tag(input: &str) -> IResult<&str, &str> {
    delimited(tag("<%"), code_body, tag("%>")).parse(input)
}

/// Tag contents up to `%>`; a `%>` inside a quoted string does not close the tag
fn code_body(input: &str) -> IResult<&str, &str> {
    recognize(many0_count(alt((
        quoted_span,
        recognize(preceded(not(tag("%>")), none_of("'\""))),
    ))))
    .parse(input)
}

fn quoted_span(input: &str) -> IResult<&str, &str> {
    alt((
        recognize(delimited(
            char('\''),
            many0_count(alt((preceded(char('\\'), anychar), none_of("\\'")))),
            char('\''),
        )),
        recognize(delimited(
            char('"'),
            many0_count(alt((preceded(char('\\'), anychar), none_of("\\\"")))),
            char('"'),
        )),
    ))
    .parse(input)
}

fn line_break(input: &str) -> IResult<&str, &str> {
    alt((tag("\r\n"), tag("\n"))).parse(input)
}

fn classify(inner: &str) -> Segment<'_> {
    let code = inner.strip_suffix('-').unwrap_or(inner);
    match code.strip_prefix('=') {
        Some(expr) => Segment::Output(expr.trim()),
        None => Segment::Statement(code.trim()),
    }
}

// --- Block structure ---

#[derive(Debug, Clone, PartialEq)]
enum Statement {
    If(Expr),
    Unless(Expr),
    Elsif(Expr),
    Else,
    End,
    For(String, Expr),
}

/// Open block awaiting its `end`
#[derive(Debug)]
enum Frame {
    If {
        line: usize,
        branches: Vec<(Expr, Vec<Node>)>,
        cond: Expr,
        body: Vec<Node>,
        otherwise: Option<Vec<Node>>,
    },
    For {
        line: usize,
        var: String,
        iter: Expr,
        body: Vec<Node>,
    },
}

#[derive(Debug, Default)]
struct TreeBuilder {
    root: Vec<Node>,
    stack: Vec<Frame>,
}

impl TreeBuilder {
    fn current(&mut self) -> &mut Vec<Node> {
        match self.stack.last_mut() {
            None => &mut self.root,
            Some(Frame::If {
                otherwise: Some(otherwise),
                ..
            }) => otherwise,
            Some(Frame::If { body, .. }) => body,
            Some(Frame::For { body, .. }) => body,
        }
    }

    fn push(&mut self, node: Node) {
        self.current().push(node);
    }

    fn statement(&mut self, code: &str, line: usize) -> ParseResult<()> {
        match parse_statement(code, line)? {
            Statement::If(cond) => self.open_if(cond, line),
            Statement::Unless(cond) => self.open_if(Expr::Not(Box::new(cond)), line),
            Statement::Elsif(new_cond) => match self.stack.last_mut() {
                Some(Frame::If {
                    branches,
                    cond,
                    body,
                    otherwise: None,
                    ..
                }) => {
                    let prev = std::mem::replace(cond, new_cond);
                    branches.push((prev, std::mem::take(body)));
                }
                _ => return Err(SyntaxError::new(line, "'elsif' without matching 'if'")),
            },
            Statement::Else => match self.stack.last_mut() {
                Some(Frame::If { otherwise, .. }) if otherwise.is_none() => {
                    *otherwise = Some(Vec::new());
                }
                _ => return Err(SyntaxError::new(line, "'else' without matching 'if'")),
            },
            Statement::End => {
                let node = match self.stack.pop() {
                    Some(Frame::If {
                        mut branches,
                        cond,
                        body,
                        otherwise,
                        ..
                    }) => {
                        branches.push((cond, body));
                        Node::If {
                            branches,
                            otherwise: otherwise.unwrap_or_default(),
                        }
                    }
                    Some(Frame::For { var, iter, body, .. }) => Node::For { var, iter, body },
                    None => return Err(SyntaxError::new(line, "'end' without an open block")),
                };
                self.push(node);
            }
            Statement::For(var, iter) => self.stack.push(Frame::For {
                line,
                var,
                iter,
                body: Vec::new(),
            }),
        }
        Ok(())
    }

    fn open_if(&mut self, cond: Expr, line: usize) {
        self.stack.push(Frame::If {
            line,
            branches: Vec::new(),
            cond,
            body: Vec::new(),
            otherwise: None,
        });
    }

    fn finish(mut self) -> ParseResult<Vec<Node>> {
        match self.stack.pop() {
            None => Ok(self.root),
            Some(Frame::If { line, .. }) => {
                Err(SyntaxError::new(line, "unterminated 'if' block, expected 'end'"))
            }
            Some(Frame::For { line, .. }) => {
                Err(SyntaxError::new(line, "unterminated loop, expected 'end'"))
            }
        }
    }
}

// --- Entry points for tag contents ---

fn parse_expression(code: &str, line: usize) -> ParseResult<Expr> {
    if code.trim().is_empty() {
        return Err(SyntaxError::new(line, "expected an expression"));
    }
    match or_expr(code) {
        Ok((remaining, expr)) if remaining.trim().is_empty() => Ok(expr),
        Ok((remaining, _)) => Err(unexpected(line, remaining)),
        Err(_) => Err(SyntaxError::new(
            line,
            format!("invalid expression '{}'", code.trim()),
        )),
    }
}

fn parse_statement(code: &str, line: usize) -> ParseResult<Statement> {
    if code.trim().is_empty() {
        return Err(SyntaxError::new(line, "empty tag"));
    }
    match statement(code) {
        Ok((remaining, stmt)) if remaining.trim().is_empty() => Ok(stmt),
        Ok((remaining, _)) => Err(unexpected(line, remaining)),
        Err(nom::Err::Failure(_)) => Err(SyntaxError::new(
            line,
            format!("invalid expression in '{}'", code.trim()),
        )),
        Err(_) => Err(SyntaxError::new(
            line,
            "unsupported statement; expected if, elsif, else, unless, for, each or end",
        )),
    }
}

fn unexpected(line: usize, remaining: &str) -> SyntaxError {
    SyntaxError::new(line, format!("unexpected input '{}'", remaining.trim()))
}

// --- Statement combinators ---

fn statement(input: &str) -> IResult<&str, Statement> {
    ws(alt((
        map(preceded(keyword("if"), cut(or_expr)), Statement::If),
        map(preceded(keyword("unless"), cut(or_expr)), Statement::Unless),
        map(preceded(keyword("elsif"), cut(or_expr)), Statement::Elsif),
        value(Statement::Else, keyword("else")),
        value(Statement::End, keyword("end")),
        for_loop,
        each_loop,
    )))
    .parse(input)
}

/// `for name in expr`
fn for_loop(input: &str) -> IResult<&str, Statement> {
    map(
        preceded(
            keyword("for"),
            cut((ws(local_name), keyword("in"), or_expr)),
        ),
        |(var, _, iter)| Statement::For(var, iter),
    )
    .parse(input)
}

/// `path.each do |name|`
fn each_loop(input: &str) -> IResult<&str, Statement> {
    map_opt(
        (
            path,
            ws(keyword("do")),
            delimited(ws(char('|')), local_name, ws(char('|'))),
        ),
        |(mut segments, _, var)| {
            if segments.len() < 2 || segments.last().map(String::as_str) != Some("each") {
                return None;
            }
            segments.pop();
            Some(Statement::For(var, Expr::Var(segments)))
        },
    )
    .parse(input)
}

// --- Expression combinators, lowest precedence first ---

fn or_expr(input: &str) -> IResult<&str, Expr> {
    map(
        pair(
            and_expr,
            many0(preceded(ws(alt((tag("||"), keyword("or")))), and_expr)),
        ),
        |(first, rest)| {
            rest.into_iter()
                .fold(first, |lhs, rhs| Expr::Or(Box::new(lhs), Box::new(rhs)))
        },
    )
    .parse(input)
}

fn and_expr(input: &str) -> IResult<&str, Expr> {
    map(
        pair(
            not_expr,
            many0(preceded(ws(alt((tag("&&"), keyword("and")))), not_expr)),
        ),
        |(first, rest)| {
            rest.into_iter()
                .fold(first, |lhs, rhs| Expr::And(Box::new(lhs), Box::new(rhs)))
        },
    )
    .parse(input)
}

fn not_expr(input: &str) -> IResult<&str, Expr> {
    alt((
        map(
            preceded(ws(alt((bang, keyword("not")))), not_expr),
            |inner| Expr::Not(Box::new(inner)),
        ),
        comparison,
    ))
    .parse(input)
}

/// A single `==` or `!=`; comparisons do not chain
fn comparison(input: &str) -> IResult<&str, Expr> {
    map(
        pair(primary, opt(pair(ws(alt((tag("=="), tag("!=")))), primary))),
        |(lhs, rhs)| match rhs {
            Some(("==", rhs)) => Expr::Eq(Box::new(lhs), Box::new(rhs)),
            Some((_, rhs)) => Expr::Ne(Box::new(lhs), Box::new(rhs)),
            None => lhs,
        },
    )
    .parse(input)
}

fn primary(input: &str) -> IResult<&str, Expr> {
    ws(alt((
        map(string_literal, Expr::Str),
        map(symbol, |name: &str| Expr::Str(name.to_string())),
        integer,
        delimited(char('('), or_expr, ws(char(')'))),
        value(Expr::Bool(true), keyword("true")),
        value(Expr::Bool(false), keyword("false")),
        value(Expr::Nil, keyword("nil")),
        map(preceded(keyword("import"), primary), |arg| {
            Expr::Import(Box::new(arg))
        }),
        map(path, Expr::Var),
    )))
    .parse(input)
}

/// Integers evaluate to their decimal text so they compare equal to loop
/// indexes and numbers read from the book configuration
fn integer(input: &str) -> IResult<&str, Expr> {
    map_res(
        terminated(recognize(pair(opt(char('-')), digit1)), not(satisfy(is_ident_char))),
        |digits: &str| digits.parse::<i64>().map(|n| Expr::Str(n.to_string())),
    )
    .parse(input)
}

/// `:name`, which evaluates to the string `name`
fn symbol(input: &str) -> IResult<&str, &str> {
    preceded(char(':'), identifier).parse(input)
}

fn string_literal(input: &str) -> IResult<&str, String> {
    alt((
        delimited(
            char('"'),
            fold_many0(double_quoted_char, String::new, push_char),
            char('"'),
        ),
        delimited(
            char('\''),
            fold_many0(single_quoted_char, String::new, push_char),
            char('\''),
        ),
    ))
    .parse(input)
}

fn push_char(mut acc: String, c: char) -> String {
    acc.push(c);
    acc
}

fn double_quoted_char(input: &str) -> IResult<&str, char> {
    alt((
        preceded(
            char('\\'),
            alt((
                value('\n', char('n')),
                value('\t', char('t')),
                char('"'),
                char('\\'),
            )),
        ),
        none_of("\"\\"),
    ))
    .parse(input)
}

/// Only `\'` and `\\` are escapes; any other backslash is literal
fn single_quoted_char(input: &str) -> IResult<&str, char> {
    alt((
        preceded(char('\\'), alt((char('\''), char('\\')))),
        char('\\'),
        none_of("'\\"),
    ))
    .parse(input)
}

/// Dotted variable path; the head may carry a leading `@`
fn path(input: &str) -> IResult<&str, Vec<String>> {
    map(
        pair(local_name, many0(preceded(char('.'), identifier))),
        |(head, fields)| {
            let mut segments = vec![head];
            segments.extend(fields.into_iter().map(String::from));
            segments
        },
    )
    .parse(input)
}

/// Variable name with any leading `@` dropped
fn local_name(input: &str) -> IResult<&str, String> {
    map(
        verify(preceded(many0_count(char('@')), identifier), |name: &str| {
            !is_keyword(name)
        }),
        String::from,
    )
    .parse(input)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c: char| c.is_alphabetic() || c == '_'),
        take_while(is_ident_char),
    ))
    .parse(input)
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '?'
}

fn bang(input: &str) -> IResult<&str, &str> {
    terminated(tag("!"), not(char('='))).parse(input)
}

/// A reserved word that is not the prefix of a longer name
fn keyword<'a>(
    word: &'static str,
) -> impl Parser<&'a str, Output = &'a str, Error = nom::error::Error<&'a str>> {
    terminated(tag(word), not(satisfy(is_ident_char)))
}

fn is_keyword(word: &str) -> bool {
    matches!(
        word,
        "if" | "elsif"
            | "else"
            | "unless"
            | "end"
            | "for"
            | "in"
            | "do"
            | "and"
            | "or"
            | "not"
            | "true"
            | "false"
            | "nil"
            | "import"
    )
}

fn ws<'a, F, O, E>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
    E: nom::error::ParseError<&'a str>,
{
    delimited(multispace0, inner, multispace0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(path: &str) -> Expr {
        Expr::Var(path.split('.').map(String::from).collect())
    }

    #[test]
    fn test_plain_text() {
        let nodes = parse("hello\nworld\n").unwrap();
        assert_eq!(nodes, vec![Node::Text("hello\nworld\n".to_string())]);
    }

    #[test]
    fn test_output_and_import() {
        let nodes = parse("<h1><%= @book.title %></h1><%= import('a.html.erb') %>").unwrap();
        assert_eq!(
            nodes,
            vec![
                Node::Text("<h1>".to_string()),
                Node::Output(var("book.title")),
                Node::Text("</h1>".to_string()),
                Node::Output(Expr::Import(Box::new(Expr::Str("a.html.erb".to_string())))),
            ]
        );
    }

    #[test]
    fn test_import_without_parens() {
        let nodes = parse("<%= import \"ch/one.html.erb\" %>").unwrap();
        assert_eq!(
            nodes,
            vec![Node::Output(Expr::Import(Box::new(Expr::Str(
                "ch/one.html.erb".to_string()
            ))))]
        );
    }

    #[test]
    fn test_if_elsif_else() {
        let src = "<% if @output == :epub %>E<% elsif output != 'pdf' %>H<% else %>P<% end %>";
        let nodes = parse(src).unwrap();
        assert_eq!(
            nodes,
            vec![Node::If {
                branches: vec![
                    (
                        Expr::Eq(Box::new(var("output")), Box::new(Expr::Str("epub".to_string()))),
                        vec![Node::Text("E".to_string())]
                    ),
                    (
                        Expr::Ne(Box::new(var("output")), Box::new(Expr::Str("pdf".to_string()))),
                        vec![Node::Text("H".to_string())]
                    ),
                ],
                otherwise: vec![Node::Text("P".to_string())],
            }]
        );
    }

    #[test]
    fn test_each_loop() {
        let nodes = parse("<% @book.chapters.each do |chapter| %><%= chapter.title %><% end %>").unwrap();
        assert_eq!(
            nodes,
            vec![Node::For {
                var: "chapter".to_string(),
                iter: var("book.chapters"),
                body: vec![Node::Output(var("chapter.title"))],
            }]
        );
    }

    #[test]
    fn test_escaped_open_and_comment() {
        let nodes = parse("a <%% b <%# ignored %>c").unwrap();
        assert_eq!(nodes, vec![Node::Text("a <% b ".to_string()), Node::Text("c".to_string())]);
    }

    #[test]
    fn test_comment_with_apostrophe() {
        let nodes = parse("<%# don't %>x").unwrap();
        assert_eq!(nodes, vec![Node::Text("x".to_string())]);
    }

    #[test]
    fn test_comment_quote_does_not_reach_next_tag() {
        let nodes = parse("<%# it's %>A<%= 'x' %>B").unwrap();
        assert_eq!(
            nodes,
            vec![
                Node::Text("A".to_string()),
                Node::Output(Expr::Str("x".to_string())),
                Node::Text("B".to_string()),
            ]
        );
    }

    #[test]
    fn test_comment_trim_marker() {
        let nodes = parse("<%# \"quoted\" note -%>\nx").unwrap();
        assert_eq!(nodes, vec![Node::Text("x".to_string())]);
    }

    #[test]
    fn test_multiline_comment_keeps_line_numbers() {
        let err = parse("<%# first\nsecond\n%>\n<% end %>").unwrap_err();
        assert_eq!(err.line, 4);
        assert!(err.message.contains("'end'"));
    }

    #[test]
    fn test_trim_marker_swallows_one_newline() {
        let nodes = parse("<% if true -%>\n\nx<% end -%>\ny").unwrap();
        assert_eq!(
            nodes,
            vec![
                Node::If {
                    branches: vec![(Expr::Bool(true), vec![Node::Text("\nx".to_string())])],
                    otherwise: vec![],
                },
                Node::Text("y".to_string()),
            ]
        );
    }

    #[test]
    fn test_close_marker_inside_string() {
        let nodes = parse("<%= '%>' %>").unwrap();
        assert_eq!(nodes, vec![Node::Output(Expr::Str("%>".to_string()))]);
    }

    #[test]
    fn test_unterminated_tag_reports_line() {
        let err = parse("one\ntwo <%= title").unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.message.contains("unterminated tag"));
    }

    #[test]
    fn test_unterminated_block() {
        let err = parse("<% if true %>\nbody\n").unwrap_err();
        assert_eq!(err.line, 1);
        assert!(err.message.contains("'end'"));
    }

    #[test]
    fn test_stray_end_and_else() {
        assert!(parse("<% end %>").is_err());
        assert!(parse("<% else %>").is_err());
        assert!(parse("<% if a %><% else %><% else %><% end %>").is_err());
    }

    #[test]
    fn test_arbitrary_code_is_rejected() {
        assert!(parse("<%= system('rm -rf /') %>").is_err());
        assert!(parse("<% x = 1 %>").is_err());
        assert!(parse("<%= title + author %>").is_err());
    }

    #[test]
    fn test_integer_literals() {
        let nodes = parse("<% if chapter_index == 1 %>first<% end %><%= 007 %>").unwrap();
        assert_eq!(
            nodes,
            vec![
                Node::If {
                    branches: vec![(
                        Expr::Eq(Box::new(var("chapter_index")), Box::new(Expr::Str("1".to_string()))),
                        vec![Node::Text("first".to_string())]
                    )],
                    otherwise: vec![],
                },
                Node::Output(Expr::Str("7".to_string())),
            ]
        );
        assert!(parse("<%= 1abc %>").is_err());
    }

    #[test]
    fn test_keywords_need_a_word_boundary() {
        let nodes = parse("<%= notes or order %>").unwrap();
        assert_eq!(
            nodes,
            vec![Node::Output(Expr::Or(Box::new(var("notes")), Box::new(var("order"))))]
        );
    }

    #[test]
    fn test_for_in_loop() {
        let nodes = parse("<% for c in @chapters %><%= c.title %><% end %>").unwrap();
        assert_eq!(
            nodes,
            vec![Node::For {
                var: "c".to_string(),
                iter: var("chapters"),
                body: vec![Node::Output(var("c.title"))],
            }]
        );
    }

    #[test]
    fn test_statement_errors_name_the_problem() {
        let err = parse("<% if %>x<% end %>").unwrap_err();
        assert!(err.message.contains("invalid expression"));
        let err = parse("<% end extra %>").unwrap_err();
        assert!(err.message.contains("unexpected input 'extra'"));
        let err = parse("<% x = 1 %>").unwrap_err();
        assert!(err.message.contains("unsupported statement"));
    }

    #[test]
    fn test_operator_precedence() {
        let nodes = parse("<%= !a && b || c %>").unwrap();
        assert_eq!(
            nodes,
            vec![Node::Output(Expr::Or(
                Box::new(Expr::And(
                    Box::new(Expr::Not(Box::new(var("a")))),
                    Box::new(var("b"))
                )),
                Box::new(var("c"))
            ))]
        );
    }
}
