//! Person CSV parser using nom
//!
//! Line format (no header, no quoting):
//! ```text
//! id,firstname,lastname,gender,country
//! 1,Michael,Smith,M,Germany
//! ```
//!
//! `id` is an unsigned decimal, `gender` is `M` or `F`, every other field is
//! a non-empty run of bytes without a comma. Lines may end in `\n` or `\r\n`.

use nom::{
    bytes::complete::{take_until, take_while1},
    character::complete::{char, digit1},
    combinator::{all_consuming, map_res},
    sequence::{terminated, tuple},
    IResult,
};

use crate::error::{Error, Result};
use crate::record::{Gender, Person};

/// Raw fields of one record line, borrowed from the input
type RawFields<'a> = (u64, &'a [u8], &'a [u8], &'a [u8], &'a [u8]);

/// Parse a single line (raw, no interpretation)
///
/// Returns the line content without the trailing newline
pub fn parse_line(input: &[u8]) -> IResult<&[u8], &[u8]> {
    terminated(take_until("\n"), char('\n'))(input)
}

fn decimal(input: &[u8]) -> IResult<&[u8], u64> {
    map_res(digit1, |digits: &[u8]| {
        std::str::from_utf8(digits)
            .map_err(|_| ())
            .and_then(|s| s.parse::<u64>().map_err(|_| ()))
    })(input)
}

fn field(input: &[u8]) -> IResult<&[u8], &[u8]> {
    take_while1(|c: u8| c != b',')(input)
}

fn raw_fields(input: &[u8]) -> IResult<&[u8], RawFields<'_>> {
    all_consuming(tuple((
        terminated(decimal, char(',')),
        terminated(field, char(',')),
        terminated(field, char(',')),
        terminated(field, char(',')),
        field,
    )))(input)
}

fn text(raw: &[u8], name: &str, line: usize) -> Result<String> {
    String::from_utf8(raw.to_vec()).map_err(|_| Error::Parse {
        line,
        message: format!("{} is not valid UTF-8", name),
    })
}

/// Parse one record line into a [`Person`]
///
/// `line_no` is only used for error reporting.
pub fn parse_person(line: &[u8], line_no: usize) -> Result<Person> {
    let line = line.strip_suffix(b"\r").unwrap_or(line);

    let (_, (id, firstname, lastname, gender, country)) =
        raw_fields(line).map_err(|e| Error::Parse {
            line: line_no,
            message: format!(
                "expected id,firstname,lastname,gender,country ({})",
                describe(&e)
            ),
        })?;

    let gender_text = text(gender, "gender", line_no)?;
    let gender = Gender::parse(&gender_text).ok_or_else(|| Error::Parse {
        line: line_no,
        message: format!("invalid gender '{}'", gender_text),
    })?;

    Ok(Person {
        id,
        firstname: text(firstname, "firstname", line_no)?,
        lastname: text(lastname, "lastname", line_no)?,
        gender,
        country: text(country, "country", line_no)?,
    })
}

fn describe(err: &nom::Err<nom::error::Error<&[u8]>>) -> String {
    match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            format!("{:?} at '{}'", e.code, String::from_utf8_lossy(e.input))
        }
        nom::Err::Incomplete(_) => "incomplete input".to_string(),
    }
}

/// Parse a whole feed, one record per line
///
/// Blank lines are skipped. The first malformed line aborts the parse.
pub fn parse_persons(input: &[u8]) -> Result<Vec<Person>> {
    let mut persons = Vec::new();
    let mut rest = input;
    let mut line_no = 0;

    while !rest.is_empty() {
        line_no += 1;
        let line = match parse_line(rest) {
            Ok((remaining, line)) => {
                rest = remaining;
                line
            }
            // Last line without a trailing newline
            Err(_) => std::mem::take(&mut rest),
        };

        if line.is_empty() || line == b"\r" {
            continue;
        }
        persons.push(parse_person(line, line_no)?);
    }

    Ok(persons)
}
