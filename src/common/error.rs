use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Classificação grossa dos erros, usada pelos chamadores (HTTP, webhook)
/// para distinguir "não existe" de "regra de negócio" de "infraestrutura".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    BusinessRejection,
    Infrastructure,
}

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // --- Não encontrado ---
    #[error("Pedido {0} não encontrado")]
    OrderNotFound(i32),

    #[error("Produto {0} não encontrado")]
    ProductNotFound(i32),

    #[error("Treinamento {0} não encontrado")]
    TrainingNotFound(i32),

    #[error("Evento {0} não encontrado")]
    EventNotFound(i32),

    #[error("Usuário {0} não encontrado")]
    UserNotFound(i32),

    #[error("Inscrição do pedido {order_id} para o usuário {user_id} não encontrada")]
    RegistrationNotFound { order_id: i32, user_id: i32 },

    #[error("Pagamento {0} não encontrado")]
    PaymentNotFound(String),

    #[error("Cupom '{0}' não encontrado")]
    PromoCodeNotFound(String),

    #[error("Assinatura do pedido {0} não encontrada")]
    SubscriptionNotFound(i32),

    #[error("Plano {0} não encontrado")]
    PlanNotFound(i32),

    #[error("Scan {0} não encontrado")]
    ScanNotFound(uuid::Uuid),

    // --- Regras de negócio ---
    #[error("Pedido {0} não possui itens")]
    EmptyOrder(i32),

    #[error("Estoque insuficiente para o produto {product_id}: disponível {available}, solicitado {requested}")]
    InsufficientStock { product_id: i32, available: i32, requested: i32 },

    #[error("Vagas insuficientes no treinamento {training_id}: disponível {available}, solicitado {requested}")]
    InsufficientCapacity { training_id: i32, available: i32, requested: i32 },

    #[error("Variante do produto {product_id} não pôde ser resolvida a partir de '{hint}'")]
    VariantNotResolved { product_id: i32, hint: String },

    #[error("Transição de status inválida: {from} -> {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("Status de pedido desconhecido: '{0}'")]
    UnknownOrderStatus(String),

    #[error("Compra sem conta não permitida para {0}")]
    GuestCheckoutNotAllowed(String),

    #[error("Cupom recusado: {0}")]
    PromoCodeRejected(String),

    #[error("Cupom {promo_code_id} já utilizado pelo usuário {user_id}")]
    PromoCodeAlreadyUsed { user_id: i32, promo_code_id: i32 },

    #[error("Cupom '{0}' já existe")]
    PromoCodeAlreadyExists(String),

    #[error("Usuário {user_id} já possui o plano {plan_id} ativo")]
    SubscriptionAlreadyActive { user_id: i32, plan_id: i32 },

    #[error("Usuário {0} esgotou as segmentações da assinatura")]
    SegmentationQuotaExhausted(i32),

    #[error("Usuário {user_id} já inscrito em {target}")]
    AlreadyRegistered { user_id: i32, target: String },

    #[error("Evento {0} lotado")]
    EventFull(i32),

    #[error("E-mail '{0}' já cadastrado")]
    EmailAlreadyExists(String),

    // --- Infraestrutura ---
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro na API de processamento de scans: {0}")]
    MeshApiError(String),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::OrderNotFound(_)
            | AppError::ProductNotFound(_)
            | AppError::TrainingNotFound(_)
            | AppError::EventNotFound(_)
            | AppError::UserNotFound(_)
            | AppError::RegistrationNotFound { .. }
            | AppError::PaymentNotFound(_)
            | AppError::PromoCodeNotFound(_)
            | AppError::SubscriptionNotFound(_)
            | AppError::PlanNotFound(_)
            | AppError::ScanNotFound(_) => ErrorKind::NotFound,

            AppError::DatabaseError(_)
            | AppError::MeshApiError(_)
            | AppError::InternalServerError(_) => ErrorKind::Infrastructure,

            _ => ErrorKind::BusinessRejection,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::ValidationError(errors) = &self {
            let mut details = std::collections::HashMap::new();
            for (field, field_errors) in errors.field_errors() {
                let messages: Vec<String> = field_errors.iter()
                    .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                    .collect();
                details.insert(field.to_string(), messages);
            }
            let body = Json(json!({
                "error": "Um ou mais campos são inválidos.",
                "details": details,
            }));
            return (StatusCode::BAD_REQUEST, body).into_response();
        }

        let (status, message) = match self.kind() {
            ErrorKind::NotFound => (StatusCode::NOT_FOUND, self.to_string()),
            ErrorKind::BusinessRejection => {
                tracing::warn!("⚠️ Operação recusada: {}", self);
                (StatusCode::CONFLICT, self.to_string())
            }
            // O detalhe fica só no log.
            ErrorKind::Infrastructure => {
                tracing::error!("🔥 Erro Interno do Servidor: {:?}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.".to_string())
            }
        };

        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}
