//! Chat command parser
//!
//! ```text
//! /pin 123456
//! /mesa 4
//! Ordenar 1 de Boneless, 2 de Arepas
//! Bebida 1 de Mojito
//! ```

use shared::models::Area;
use thiserror::Error;

/// Largest quantity accepted per line
const MAX_QUANTITY: i32 = 99;

#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    pub quantity: i32,
    pub item: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Pin(String),
    Table(String),
    Order { area: Area, lines: Vec<OrderLine> },
}

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("Falta el argumento de {0}")]
    MissingArgument(&'static str),
    #[error("Línea inválida: '{0}'. Usa: <cantidad> de <plato>")]
    InvalidLine(String),
    #[error("Cantidad inválida en '{0}' (1-99)")]
    InvalidQuantity(String),
    #[error("Formato incorrecto")]
    Unrecognized,
}

pub fn parse(text: &str) -> Result<Command, ParseError> {
    let text = text.trim();
    let (head, rest) = match text.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (text, ""),
    };
    // "/pin@MyBot 1234" in group chats
    let keyword = head.split('@').next().unwrap_or(head).to_lowercase();

    match keyword.as_str() {
        "/start" | "/ayuda" | "/help" => Ok(Command::Help),
        "/pin" => argument(rest, "/pin").map(Command::Pin),
        "/mesa" => argument(rest, "/mesa").map(Command::Table),
        "ordenar" => order(Area::Kitchen, rest),
        "bebida" => order(Area::Bar, rest),
        _ => Err(ParseError::Unrecognized),
    }
}

fn argument(rest: &str, command: &'static str) -> Result<String, ParseError> {
    rest.split_whitespace()
        .next()
        .map(String::from)
        .ok_or(ParseError::MissingArgument(command))
}

fn order(area: Area, rest: &str) -> Result<Command, ParseError> {
    let lines = rest
        .split(',')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(line)
        .collect::<Result<Vec<_>, _>>()?;
    if lines.is_empty() {
        return Err(ParseError::MissingArgument("la orden"));
    }
    Ok(Command::Order { area, lines })
}

/// `<qty> de <item>`
fn line(raw: &str) -> Result<OrderLine, ParseError> {
    let mut parts = raw.splitn(3, char::is_whitespace);
    let (Some(qty), Some(de), Some(item)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ParseError::InvalidLine(raw.to_string()));
    };
    if !de.eq_ignore_ascii_case("de") || item.trim().is_empty() {
        return Err(ParseError::InvalidLine(raw.to_string()));
    }
    let quantity: i32 = qty
        .parse()
        .map_err(|_| ParseError::InvalidQuantity(raw.to_string()))?;
    if !(1..=MAX_QUANTITY).contains(&quantity) {
        return Err(ParseError::InvalidQuantity(raw.to_string()));
    }
    Ok(OrderLine {
        quantity,
        item: item.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l(quantity: i32, item: &str) -> OrderLine {
        OrderLine {
            quantity,
            item: item.into(),
        }
    }

    #[test]
    fn kitchen_and_bar_orders() {
        assert_eq!(
            parse("Ordenar 1 de Boneless, 2 de Arepas de queso"),
            Ok(Command::Order {
                area: Area::Kitchen,
                lines: vec![l(1, "Boneless"), l(2, "Arepas de queso")],
            })
        );
        assert_eq!(
            parse("  bebida 3 DE Mojito,"),
            Ok(Command::Order {
                area: Area::Bar,
                lines: vec![l(3, "Mojito")],
            })
        );
    }

    #[test]
    fn commands_with_arguments() {
        assert_eq!(parse("/pin 123456"), Ok(Command::Pin("123456".into())));
        assert_eq!(parse("/mesa@PosBot T4"), Ok(Command::Table("T4".into())));
        assert_eq!(parse("/ayuda"), Ok(Command::Help));
        assert_eq!(parse("/pin"), Err(ParseError::MissingArgument("/pin")));
    }

    #[test]
    fn malformed_orders_are_rejected() {
        assert_eq!(
            parse("Ordenar dos de Tacos"),
            Err(ParseError::InvalidQuantity("dos de Tacos".into()))
        );
        assert_eq!(
            parse("Ordenar 0 de Tacos"),
            Err(ParseError::InvalidQuantity("0 de Tacos".into()))
        );
        assert_eq!(
            parse("Ordenar 2 Tacos"),
            Err(ParseError::InvalidLine("2 Tacos".into()))
        );
        assert_eq!(parse("Ordenar"), Err(ParseError::MissingArgument("la orden")));
        assert_eq!(parse("hola"), Err(ParseError::Unrecognized));
    }
}
