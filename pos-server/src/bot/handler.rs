//! Chat handler - turns one message into one reply

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Area, OrderCreate, OrderItemInput, OrderSource};
use shared::util::now_millis;
use sqlx::SqlitePool;

use super::parser::{self, Command, OrderLine};
use crate::db::repository::bot_chat::{self, BotChat};
use crate::db::repository::{dining_table, menu_item, table_session, user};
use crate::orders::OrderService;

/// A PIN binding lasts one shift
pub const BINDING_TTL_MS: i64 = 10 * 60 * 60 * 1000;

pub const INSTRUCTIONS: &str = "Instrucciones para realizar un pedido:

1. Identifícate con /pin <tu PIN>
2. Elige la mesa con /mesa <número>

Para la cocina, envía:
Ordenar X de Y, Z de W

Para la barra, envía:
Bebida X de Y, Z de W

Por ejemplo:
Ordenar 1 de Boneless, 2 de Arepas
Bebida 1 de Mojito, 2 de Margarita";

#[derive(Clone, Debug)]
pub struct BotHandler {
    pool: SqlitePool,
    orders: OrderService,
}

impl BotHandler {
    pub fn new(pool: SqlitePool, orders: OrderService) -> Self {
        Self { pool, orders }
    }

    /// Reply to a chat message
    pub async fn handle(&self, chat_id: i64, text: &str) -> String {
        let command = match parser::parse(text) {
            Ok(command) => command,
            Err(parser::ParseError::Unrecognized) => {
                return format!("⚠️ Formato incorrecto.\n\n{INSTRUCTIONS}");
            }
            Err(e) => return format!("⚠️ {e}"),
        };

        let result = match command {
            Command::Help => Ok(INSTRUCTIONS.to_string()),
            Command::Pin(pin) => self.bind(chat_id, &pin).await,
            Command::Table(number) => self.select_table(chat_id, &number).await,
            Command::Order { area, lines } => self.order(chat_id, area, &lines).await,
        };
        result.unwrap_or_else(|e| {
            tracing::warn!(chat_id, code = ?e.code, error = %e.message, "Bot command failed");
            format!("⚠️ {}", e.message)
        })
    }

    async fn bind(&self, chat_id: i64, pin: &str) -> AppResult<String> {
        let Some(staff) = user::find_by_pin(&self.pool, pin).await? else {
            crate::security_log!("WARN", "bot_pin_rejected", chat_id = chat_id);
            return Err(AppError::with_message(ErrorCode::InvalidCredentials, "PIN no válido"));
        };
        if staff.pin_expiration < now_millis() {
            return Err(AppError::with_message(ErrorCode::PinExpired, "PIN expirado"));
        }

        bot_chat::bind(&self.pool, chat_id, staff.id, BINDING_TTL_MS).await?;
        tracing::info!(chat_id, user_id = staff.id, "Telegram chat bound");

        let name = staff
            .alias
            .or(staff.username)
            .unwrap_or_else(|| "compañero".to_string());
        Ok(format!(
            "🎉 Bienvenido, {name}! Elige una mesa con /mesa <número> para empezar a pedir."
        ))
    }

    async fn binding(&self, chat_id: i64) -> AppResult<BotChat> {
        bot_chat::find_active(&self.pool, chat_id, now_millis())
            .await?
            .ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::NotAuthenticated,
                    "🔒 Identifícate primero con /pin <tu PIN>",
                )
            })
    }

    async fn select_table(&self, chat_id: i64, number: &str) -> AppResult<String> {
        self.binding(chat_id).await?;
        let table = dining_table::find_by_number(&self.pool, number)
            .await?
            .ok_or_else(|| {
                AppError::with_message(ErrorCode::TableNotFound, format!("La mesa {number} no existe"))
            })?;
        let session = table_session::find_open_for_table(&self.pool, table.id)
            .await?
            .ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::SessionNotFound,
                    format!("La mesa {number} no tiene una sesión abierta"),
                )
            })?;

        bot_chat::select_table(&self.pool, chat_id, table.id, session.id).await?;
        Ok(format!("🪑 Mesa {} seleccionada. Ya puedes enviar pedidos.", table.number))
    }

    async fn order(&self, chat_id: i64, area: Area, lines: &[OrderLine]) -> AppResult<String> {
        let chat = self.binding(chat_id).await?;
        let Some(table_id) = chat.table_id else {
            return Err(AppError::with_message(
                ErrorCode::InvalidRequest,
                "Selecciona una mesa con /mesa <número>",
            ));
        };

        let mut items = Vec::with_capacity(lines.len());
        for line in lines {
            let item = menu_item::find_by_name(&self.pool, &line.item)
                .await?
                .ok_or_else(|| {
                    AppError::with_message(
                        ErrorCode::MenuItemNotFound,
                        format!("No encontramos '{}' en el menú", line.item),
                    )
                })?;
            let routed = menu_item::find_routed(&self.pool, item.id).await?;
            if routed.area != area {
                return Err(AppError::with_message(
                    ErrorCode::InvalidRequest,
                    format!("'{}' no es de {}", item.name, area_label(area)),
                ));
            }
            items.push(OrderItemInput {
                item_id: item.id,
                quantity: line.quantity,
                comments: vec![],
            });
        }

        let order = self
            .orders
            .create(
                OrderCreate {
                    table_id,
                    session_id: chat.session_id,
                    waiter_id: Some(chat.user_id),
                    items,
                },
                Some(chat.user_id),
                OrderSource::Telegram,
            )
            .await?;

        let summary = order
            .items
            .iter()
            .map(|i| format!("{} x {}", i.quantity, i.name))
            .collect::<Vec<_>>()
            .join(", ");
        Ok(match area {
            Area::Kitchen => format!("✅ Orden de cocina recibida: {summary}"),
            Area::Bar => format!("🍹 Orden de barra recibida: {summary}"),
        })
    }
}

fn area_label(area: Area) -> &'static str {
    match area {
        Area::Kitchen => "cocina",
        Area::Bar => "barra",
    }
}
