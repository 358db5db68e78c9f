use nom::{IResult, Parser};
use nom::branch::alt;
use nom::bytes::complete::{tag, take_until, take_while, take_while1};
use nom::character::complete::{anychar, char, multispace1, satisfy};
use nom::combinator::{map, recognize, value};
use nom::multi::many0;
use nom::sequence::{delimited, pair, preceded};
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::ObjectName;
use crate::query::ast::{
    AttachOption, AttachStatement, DetachStatement, MutationKind, MutationStatement, ObjectKind,
    Statement, UseStatement,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Word(String),
    Quoted(String),   // "identifier"
    Literal(String),  // 'string'
    Symbol(char),
}

/// Classifies SQL statements into the few shapes the catalog reacts to.
///
/// This is not a SQL parser. It reads just enough of each statement to find
/// ATTACH/DETACH/USE and the target of anything that writes; all other text
/// is left to the host engine.
#[derive(Debug, Clone, Default)]
pub struct StatementParser;

impl StatementParser {
    pub fn new() -> Self {
        StatementParser
    }

    /// Parses one statement; a trailing `;` is allowed
    pub fn parse(&self, sql: &str) -> Result<Statement> {
        let tokens = tokenize(sql)?;
        let mut statements = split_statements(&tokens);
        match statements.len() {
            0 => Ok(Statement::PassThrough),
            1 => classify(statements.remove(0)),
            n => Err(Error::new(
                ErrorKind::Parse,
                format!("expected a single statement, found {}", n),
            )),
        }
    }

    /// Parses a `;` separated script
    pub fn parse_batch(&self, sql: &str) -> Result<Vec<Statement>> {
        let tokens = tokenize(sql)?;
        split_statements(&tokens).into_iter().map(classify).collect()
    }
}

// ---------------------------------------------------------------------------
// Lexer
//
// Total over any input: characters it has no rule for become symbols, so
// host SQL the classifier does not understand still reaches the host.

fn line_comment(input: &str) -> IResult<&str, &str> {
    recognize(pair(tag("--"), take_while(|c: char| c != '\n'))).parse(input)
}

fn block_comment(input: &str) -> IResult<&str, &str> {
    recognize((tag("/*"), take_until("*/"), tag("*/"))).parse(input)
}

fn skip(input: &str) -> IResult<&str, ()> {
    value((), many0(alt((multispace1, line_comment, block_comment)))).parse(input)
}

fn word(input: &str) -> IResult<&str, Token> {
    map(
        take_while1(|c: char| c.is_alphanumeric() || c == '_' || c == '$'),
        |w: &str| Token::Word(w.to_string()),
    ).parse(input)
}

/// `delim` ... `delim`, with a doubled delimiter standing for itself
fn delimited_text(input: &str, delim: char) -> IResult<&str, String> {
    let doubled: String = [delim, delim].iter().collect();
    map(
        delimited(
            char(delim),
            many0(alt((value(delim, tag(doubled.as_str())), satisfy(|c| c != delim)))),
            char(delim),
        ),
        |chars: Vec<char>| chars.into_iter().collect(),
    ).parse(input)
}

fn string_literal(input: &str) -> IResult<&str, Token> {
    let (rest, text) = delimited_text(input, '\'')?;
    Ok((rest, Token::Literal(text)))
}

/// `"identifier"` or `` `identifier` ``
fn quoted_identifier(input: &str) -> IResult<&str, Token> {
    let delim = if input.starts_with('`') { '`' } else { '"' };
    let (rest, text) = delimited_text(input, delim)?;
    Ok((rest, Token::Quoted(text)))
}

/// `$$text$$` or `$tag$text$tag$`
fn dollar_string(input: &str) -> IResult<&str, Token> {
    let opened: IResult<&str, &str> = recognize(delimited(
        char('$'),
        take_while(|c: char| c.is_alphanumeric() || c == '_'),
        char('$'),
    )).parse(input);
    let (rest, delim) = opened?;
    let body: IResult<&str, &str> = take_until(delim).parse(rest);
    let (rest, text) = body?;
    Ok((&rest[delim.len()..], Token::Literal(text.to_string())))
}

fn symbol(input: &str) -> IResult<&str, Token> {
    map(anychar, Token::Symbol).parse(input)
}

fn token(input: &str) -> IResult<&str, Token> {
    alt((string_literal, quoted_identifier, dollar_string, word, symbol)).parse(input)
}

pub fn tokenize(sql: &str) -> Result<Vec<Token>> {
    let (rest, tokens) = many0(preceded(skip, token))
        .parse(sql)
        .map_err(|e| Error::new(ErrorKind::Parse, e.to_string()))?;
    let (rest, ()) = skip(rest).map_err(|e| Error::new(ErrorKind::Parse, e.to_string()))?;
    if !rest.is_empty() {
        let near: String = rest.chars().take(20).collect();
        return Err(Error::new(
            ErrorKind::Parse,
            format!("unexpected input near \"{}\"", near),
        ));
    }
    Ok(tokens)
}

fn split_statements(tokens: &[Token]) -> Vec<&[Token]> {
    tokens.split(|t| *t == Token::Symbol(';'))
        .filter(|s| !s.is_empty())
        .collect()
}

// ---------------------------------------------------------------------------
// Classification

struct Cursor<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> Cursor<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        Cursor { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Word(w)) if w.eq_ignore_ascii_case(keyword))
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.is_keyword(keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// All of `keywords` in order, or nothing is consumed
    fn eat_keywords(&mut self, keywords: &[&str]) -> bool {
        let start = self.pos;
        for keyword in keywords {
            if !self.eat_keyword(keyword) {
                self.pos = start;
                return false;
            }
        }
        true
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<()> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            Err(self.unexpected(keyword))
        }
    }

    fn is_symbol(&self, symbol: char) -> bool {
        self.peek() == Some(&Token::Symbol(symbol))
    }

    /// Everything not consumed yet
    fn rest(&self) -> &'t [Token] {
        &self.tokens[self.pos.min(self.tokens.len())..]
    }

    /// A balanced `( ... )` starting here; yields the tokens inside
    fn group(&mut self) -> Option<&'t [Token]> {
        if !self.is_symbol('(') {
            return None;
        }
        let mut depth = 0usize;
        for (offset, token) in self.rest().iter().enumerate() {
            match token {
                Token::Symbol('(') => depth += 1,
                Token::Symbol(')') => {
                    depth -= 1;
                    if depth == 0 {
                        let inner = &self.tokens[self.pos + 1..self.pos + offset];
                        self.pos += offset + 1;
                        return Some(inner);
                    }
                }
                _ => {}
            }
        }
        None
    }

    fn eat_symbol(&mut self, symbol: char) -> bool {
        if self.peek() == Some(&Token::Symbol(symbol)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn next_word(&mut self) -> Option<&'t str> {
        match self.peek() {
            Some(Token::Word(w)) => {
                self.pos += 1;
                Some(w.as_str())
            }
            _ => None,
        }
    }

    fn identifier(&mut self) -> Option<String> {
        match self.peek() {
            Some(Token::Word(w)) | Some(Token::Quoted(w)) => {
                self.pos += 1;
                Some(w.clone())
            }
            _ => None,
        }
    }

    fn expect_identifier(&mut self, what: &str) -> Result<String> {
        self.identifier().ok_or_else(|| self.unexpected(what))
    }

    fn literal(&mut self) -> Option<String> {
        match self.peek() {
            Some(Token::Literal(s)) => {
                self.pos += 1;
                Some(s.clone())
            }
            _ => None,
        }
    }

    fn object_name(&mut self) -> Result<ObjectName> {
        let mut parts = vec![self.expect_identifier("object name")?];
        while self.eat_symbol('.') {
            parts.push(self.expect_identifier("object name")?);
        }
        Ok(ObjectName::new(parts))
    }

    fn unexpected(&self, expected: &str) -> Error {
        let found = match self.peek() {
            Some(Token::Word(w)) => w.clone(),
            Some(Token::Quoted(q)) => format!("\"{}\"", q),
            Some(Token::Literal(l)) => format!("'{}'", l),
            Some(Token::Symbol(c)) => c.to_string(),
            None => "end of statement".to_string(),
        };
        Error::new(ErrorKind::Parse, format!("expected {}, found {}", expected, found))
    }
}

fn classify(tokens: &[Token]) -> Result<Statement> {
    let mut cursor = Cursor::new(tokens);
    while cursor.eat_symbol('(') {}
    if cursor.is_keyword("WITH") {
        return classify_with(&mut cursor);
    }
    let Some(first) = cursor.next_word() else {
        return Ok(Statement::PassThrough);
    };

    match first.to_ascii_uppercase().as_str() {
        "ATTACH" => parse_attach(&mut cursor).map(Statement::Attach),
        "DETACH" => parse_detach(&mut cursor).map(Statement::Detach),
        "USE" => Ok(Statement::Use(UseStatement { target: cursor.object_name()? })),
        "CREATE" => parse_create(&mut cursor),
        "DROP" => parse_drop_or_alter(&mut cursor, MutationKind::Drop),
        "ALTER" => parse_drop_or_alter(&mut cursor, MutationKind::Alter),
        "INSERT" => {
            if cursor.eat_keyword("OR") {
                cursor.next_word();
            }
            cursor.expect_keyword("INTO")?;
            mutation(MutationKind::Insert, ObjectKind::Table, cursor.object_name()?)
        }
        "UPDATE" => mutation(MutationKind::Update, ObjectKind::Table, cursor.object_name()?),
        "DELETE" => {
            cursor.expect_keyword("FROM")?;
            mutation(MutationKind::Delete, ObjectKind::Table, cursor.object_name()?)
        }
        "TRUNCATE" => {
            cursor.eat_keyword("TABLE");
            mutation(MutationKind::Truncate, ObjectKind::Table, cursor.object_name()?)
        }
        "MERGE" => {
            cursor.expect_keyword("INTO")?;
            mutation(MutationKind::Merge, ObjectKind::Table, cursor.object_name()?)
        }
        "COPY" => parse_copy(&mut cursor),
        // EXPLAIN ANALYZE runs the statement it explains
        "EXPLAIN" if cursor.eat_keyword("ANALYZE") => classify(cursor.rest()),
        _ => Ok(Statement::PassThrough),
    }
}

/// `WITH [RECURSIVE] name [(columns)] AS [NOT] [MATERIALIZED] (query), ...`
/// followed by the statement proper. A CTE body that writes makes the whole
/// statement a write.
fn classify_with(cursor: &mut Cursor) -> Result<Statement> {
    let all = cursor.rest();
    cursor.expect_keyword("WITH")?;
    cursor.eat_keyword("RECURSIVE");
    loop {
        if cursor.identifier().is_none() {
            return first_top_level_write(all);
        }
        cursor.group();
        if !cursor.eat_keyword("AS") {
            return first_top_level_write(all);
        }
        cursor.eat_keyword("NOT");
        cursor.eat_keyword("MATERIALIZED");
        let Some(body) = cursor.group() else {
            return first_top_level_write(all);
        };
        if let Statement::Mutation(write) = classify(body)? {
            return Ok(Statement::Mutation(write));
        }
        if !cursor.eat_symbol(',') {
            break;
        }
    }
    classify(cursor.rest())
}

/// CTE syntax not covered above: the first write keyword outside any
/// parentheses starts the statement proper
fn first_top_level_write(tokens: &[Token]) -> Result<Statement> {
    const WRITES: [&str; 6] = ["INSERT", "UPDATE", "DELETE", "MERGE", "TRUNCATE", "COPY"];
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate() {
        match token {
            Token::Symbol('(') => depth += 1,
            Token::Symbol(')') => depth = depth.saturating_sub(1),
            Token::Word(w) if depth == 0 && WRITES.iter().any(|k| w.eq_ignore_ascii_case(k)) => {
                return classify(&tokens[i..]);
            }
            _ => {}
        }
    }
    Ok(Statement::PassThrough)
}

fn mutation(kind: MutationKind, object: ObjectKind, target: ObjectName) -> Result<Statement> {
    Ok(Statement::Mutation(MutationStatement { kind, object, target }))
}

fn parse_attach(cursor: &mut Cursor) -> Result<AttachStatement> {
    let or_replace = cursor.eat_keywords(&["OR", "REPLACE"]);
    cursor.eat_keyword("DATABASE");
    let if_not_exists = cursor.eat_keywords(&["IF", "NOT", "EXISTS"]);
    let path = cursor.literal().ok_or_else(|| cursor.unexpected("quoted path"))?;

    let alias = if cursor.eat_keyword("AS") {
        Some(cursor.expect_identifier("database name")?)
    } else {
        None
    };

    let mut db_type = None;
    let mut options = Vec::new();
    if cursor.eat_symbol('(') {
        loop {
            let key = cursor.expect_identifier("option name")?;
            let value = cursor.identifier().or_else(|| cursor.literal());
            if key.eq_ignore_ascii_case("TYPE") {
                db_type = Some(value.ok_or_else(|| cursor.unexpected("database type"))?);
            } else {
                options.push(AttachOption { key, value });
            }
            if cursor.eat_symbol(',') {
                continue;
            }
            if cursor.eat_symbol(')') {
                break;
            }
            return Err(cursor.unexpected("',' or ')'"));
        }
    }

    if let Some(extra) = cursor.peek() {
        return Err(Error::new(
            ErrorKind::Parse,
            format!("unexpected {:?} after ATTACH options", extra),
        ));
    }

    Ok(AttachStatement {
        path,
        alias,
        or_replace,
        if_not_exists,
        db_type,
        options,
    })
}

fn parse_detach(cursor: &mut Cursor) -> Result<DetachStatement> {
    cursor.eat_keyword("DATABASE");
    let if_exists = cursor.eat_keywords(&["IF", "EXISTS"]);
    let name = cursor.expect_identifier("database name")?;
    Ok(DetachStatement { name, if_exists })
}

fn parse_create(cursor: &mut Cursor) -> Result<Statement> {
    cursor.eat_keywords(&["OR", "REPLACE"]);
    for modifier in ["TEMP", "TEMPORARY", "UNIQUE", "PERSISTENT"] {
        cursor.eat_keyword(modifier);
    }

    let Some(object) = cursor.next_word().and_then(ObjectKind::from_keyword) else {
        return Ok(Statement::PassThrough);
    };
    cursor.eat_keywords(&["IF", "NOT", "EXISTS"]);

    match object {
        ObjectKind::Index => {
            // The index name is optional; the table after ON is what gets written
            if !cursor.is_keyword("ON") {
                cursor.expect_identifier("index name")?;
            }
            cursor.expect_keyword("ON")?;
            mutation(MutationKind::CreateIndex, object, cursor.object_name()?)
        }
        ObjectKind::View => mutation(MutationKind::CreateView, object, cursor.object_name()?),
        _ => mutation(MutationKind::Create, object, cursor.object_name()?),
    }
}

/// `COPY table [(columns)] FROM ...` loads rows into `table`, and
/// `COPY FROM DATABASE a TO b` fills every table of `b`. Copies out with
/// `TO` only read.
fn parse_copy(cursor: &mut Cursor) -> Result<Statement> {
    if cursor.eat_keywords(&["FROM", "DATABASE"]) {
        cursor.object_name()?;
        cursor.expect_keyword("TO")?;
        return mutation(MutationKind::Insert, ObjectKind::Database, cursor.object_name()?);
    }
    if cursor.is_symbol('(') {
        return Ok(Statement::PassThrough);
    }
    let target = cursor.object_name()?;
    cursor.group();
    if cursor.eat_keyword("FROM") {
        mutation(MutationKind::Insert, ObjectKind::Table, target)
    } else {
        Ok(Statement::PassThrough)
    }
}

fn parse_drop_or_alter(cursor: &mut Cursor, kind: MutationKind) -> Result<Statement> {
    let Some(object) = cursor.next_word().and_then(ObjectKind::from_keyword) else {
        return Ok(Statement::PassThrough);
    };
    cursor.eat_keywords(&["IF", "EXISTS"]);
    mutation(kind, object, cursor.object_name()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(sql: &str) -> Statement {
        StatementParser::new().parse(sql).unwrap()
    }

    fn target(sql: &str) -> (MutationKind, ObjectKind, String) {
        match parse(sql) {
            Statement::Mutation(m) => (m.kind, m.object, m.target.to_string()),
            other => panic!("expected mutation, got {:?}", other),
        }
    }

    #[test]
    fn tokenizes_literals_and_comments() {
        let tokens = tokenize("SELECT 'it''s' -- note\n, \"Odd \"\"Name\"\"\"").unwrap();
        assert_eq!(tokens, vec![
            Token::Word("SELECT".to_string()),
            Token::Literal("it's".to_string()),
            Token::Symbol(','),
            Token::Quoted("Odd \"Name\"".to_string()),
        ]);
        // No rule for an unterminated quote; it becomes a plain symbol
        assert_eq!(tokenize("SELECT 'open").unwrap()[1], Token::Symbol('\''));
    }

    #[test]
    fn tokenizes_host_dialect_quoting() {
        let tokens = tokenize("/* don't */ SELECT `id`, $$it's$$, $fn$a;b$fn$ # \\").unwrap();
        assert_eq!(tokens, vec![
            Token::Word("SELECT".to_string()),
            Token::Quoted("id".to_string()),
            Token::Symbol(','),
            Token::Literal("it's".to_string()),
            Token::Symbol(','),
            Token::Literal("a;b".to_string()),
            Token::Symbol('#'),
            Token::Symbol('\\'),
        ]);
    }

    #[test]
    fn attach_with_options() {
        let Statement::Attach(attach) = parse(
            "ATTACH OR REPLACE 'test/data/single_schema/' AS sdb (TYPE delta_classic, PIN_SNAPSHOT);",
        ) else {
            panic!("not an attach");
        };
        assert!(attach.or_replace);
        assert!(!attach.if_not_exists);
        assert_eq!(attach.path, "test/data/single_schema/");
        assert_eq!(attach.alias.as_deref(), Some("sdb"));
        assert_eq!(attach.db_type.as_deref(), Some("delta_classic"));
        assert!(attach.option("pin_snapshot").is_some());
        assert_eq!(attach.option("pin_snapshot").unwrap().value, None);
    }

    #[test]
    fn attach_without_alias_or_options() {
        let Statement::Attach(attach) = parse("attach database if not exists 'data.db'") else {
            panic!("not an attach");
        };
        assert!(attach.if_not_exists);
        assert_eq!(attach.alias, None);
        assert_eq!(attach.db_type, None);
        assert!(attach.options.is_empty());
    }

    #[test]
    fn detach_and_use() {
        assert_eq!(
            parse("DETACH DATABASE IF EXISTS mdb"),
            Statement::Detach(DetachStatement { name: "mdb".to_string(), if_exists: true })
        );
        assert_eq!(
            parse("USE sdb"),
            Statement::Use(UseStatement { target: ObjectName::new(vec!["sdb".to_string()]) })
        );
    }

    #[test]
    fn mutation_targets() {
        assert_eq!(target("CREATE TABLE rodb.main.new_table (id INTEGER)"),
                   (MutationKind::Create, ObjectKind::Table, "rodb.main.new_table".to_string()));
        assert_eq!(target("CREATE SCHEMA rodb.new_schema"),
                   (MutationKind::Create, ObjectKind::Schema, "rodb.new_schema".to_string()));
        assert_eq!(target("DROP SCHEMA IF EXISTS rodb.main"),
                   (MutationKind::Drop, ObjectKind::Schema, "rodb.main".to_string()));
        assert_eq!(target("CREATE OR REPLACE VIEW rodb.main.v AS SELECT 1"),
                   (MutationKind::CreateView, ObjectKind::View, "rodb.main.v".to_string()));
        assert_eq!(target("CREATE UNIQUE INDEX idx ON rodb.main.table_a(id)"),
                   (MutationKind::CreateIndex, ObjectKind::Index, "rodb.main.table_a".to_string()));
        assert_eq!(target("INSERT OR REPLACE INTO rodb.main.table_a SELECT * FROM rodb.main.table_a"),
                   (MutationKind::Insert, ObjectKind::Table, "rodb.main.table_a".to_string()));
        assert_eq!(target("UPDATE rodb.main.table_a SET name = 'x' WHERE id = 1"),
                   (MutationKind::Update, ObjectKind::Table, "rodb.main.table_a".to_string()));
        assert_eq!(target("DELETE FROM table_a WHERE id = 1"),
                   (MutationKind::Delete, ObjectKind::Table, "table_a".to_string()));
        assert_eq!(target("TRUNCATE TABLE rodb.main.table_a"),
                   (MutationKind::Truncate, ObjectKind::Table, "rodb.main.table_a".to_string()));
        assert_eq!(target("ALTER TABLE rodb.main.table_a ADD COLUMN extra INTEGER"),
                   (MutationKind::Alter, ObjectKind::Table, "rodb.main.table_a".to_string()));
    }

    #[test]
    fn reads_pass_through() {
        assert_eq!(parse("SELECT COUNT(*) FROM sdb.main.table_a"), Statement::PassThrough);
        assert_eq!(parse("CREATE SECRET s (TYPE s3)"), Statement::PassThrough);
        assert_eq!(parse(""), Statement::PassThrough);
        assert_eq!(parse("/* don't */ SELECT 1"), Statement::PassThrough);
        assert_eq!(parse("SELECT `id` FROM sdb.main.table_a"), Statement::PassThrough);
        assert_eq!(parse("SELECT $$it's$$"), Statement::PassThrough);
        assert_eq!(parse("SELECT 1 # 2"), Statement::PassThrough);
        assert_eq!(parse("COPY sdb.main.table_a TO 'out.csv'"), Statement::PassThrough);
        assert_eq!(parse("COPY (SELECT * FROM sdb.main.table_a) TO 'out.csv'"), Statement::PassThrough);
        assert_eq!(parse("EXPLAIN INSERT INTO sdb.main.table_a VALUES (1)"), Statement::PassThrough);
        assert_eq!(
            parse("WITH RECURSIVE t(n) AS (SELECT 1 UNION ALL SELECT n + 1 FROM t) SELECT * FROM t"),
            Statement::PassThrough
        );
    }

    #[test]
    fn writes_behind_prefixes() {
        let insert = (MutationKind::Insert, ObjectKind::Table, "sdb.main.table_a".to_string());
        assert_eq!(target("WITH x AS (SELECT 1 AS id) INSERT INTO sdb.main.table_a SELECT * FROM x"), insert);
        assert_eq!(target("WITH a AS (SELECT 1), b(id) AS MATERIALIZED (SELECT 2) INSERT INTO sdb.main.table_a SELECT * FROM b"), insert);
        assert_eq!(target("/* note */ INSERT INTO sdb.main.table_a VALUES (1)"), insert);
        assert_eq!(target("((INSERT INTO sdb.main.table_a VALUES (9, 'z')))"), insert);
        assert_eq!(target("EXPLAIN ANALYZE INSERT INTO sdb.main.table_a VALUES (1)"), insert);
        assert_eq!(target("WITH d AS (DELETE FROM sdb.main.table_a RETURNING *) SELECT * FROM d"),
                   (MutationKind::Delete, ObjectKind::Table, "sdb.main.table_a".to_string()));
        assert_eq!(target("WITH RECURSIVE t(a) USING KEY (a) AS (SELECT 1) UPDATE sdb.main.table_a SET id = 2"),
                   (MutationKind::Update, ObjectKind::Table, "sdb.main.table_a".to_string()));
    }

    #[test]
    fn copy_and_merge_targets() {
        assert_eq!(target("COPY sdb.main.table_a FROM 'rows.csv'"),
                   (MutationKind::Insert, ObjectKind::Table, "sdb.main.table_a".to_string()));
        assert_eq!(target("COPY sdb.main.table_a (id, name) FROM 'rows.csv' (HEADER)"),
                   (MutationKind::Insert, ObjectKind::Table, "sdb.main.table_a".to_string()));
        assert_eq!(target("COPY FROM DATABASE memory TO sdb"),
                   (MutationKind::Insert, ObjectKind::Database, "sdb".to_string()));
        assert_eq!(target("MERGE INTO sdb.main.table_a t USING src s ON t.id = s.id WHEN MATCHED THEN DELETE"),
                   (MutationKind::Merge, ObjectKind::Table, "sdb.main.table_a".to_string()));
    }

    #[test]
    fn batch_splits_on_semicolons() {
        let statements = StatementParser::new()
            .parse_batch("USE sdb; SELECT 1; DETACH sdb;")
            .unwrap();
        assert_eq!(statements.len(), 3);
        assert!(StatementParser::new().parse("SELECT 1; SELECT 2").is_err());
    }
}
