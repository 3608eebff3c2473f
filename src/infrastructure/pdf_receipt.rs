use crate::config::SenderIdentity;
use crate::domain::instruction::PaymentInstruction;
use crate::domain::outcome::SubmittedPayment;
use crate::domain::pix_key::mask_key;
use crate::domain::ports::ReceiptRenderer;
use crate::domain::receipt::{PDF_CONTENT_TYPE, ReceiptDocument};
use crate::error::RenderError;
use crate::infrastructure::locale::{format_brl, format_date, format_timestamp, now_in_brasilia};
use chrono::{DateTime, FixedOffset};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, StringFormat, dictionary};
use serde_json::Value;

const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN_X: i64 = 50;
const VALUE_X: i64 = 210;
const TOP_Y: i64 = 780;
const BOTTOM_Y: i64 = 60;
const VALUE_WRAP: usize = 58;

const TITLE: &str = "Comprovante de Pagamento Pix";
const DISCLAIMER: [&str; 2] = [
    "Comprovante emitido automaticamente a partir da resposta da instituição financeira.",
    "A liquidação definitiva depende do processamento pelo Sistema de Pagamentos Instantâneos.",
];

/// Provider response fields printed in the transaction block, in order.
const TRANSACTION_FIELDS: [(&str, &str); 5] = [
    ("codigoSolicitacao", "Código da solicitação"),
    ("endToEndId", "ID fim a fim"),
    ("tipoRetorno", "Retorno"),
    ("dataOperacao", "Data da operação"),
    ("dataPagamento", "Data agendada"),
];

#[derive(Debug, Clone, PartialEq)]
pub enum Line {
    Title(String),
    Amount(String),
    Heading(String),
    Field(String, String),
    Text(String),
    Rule,
    Blank,
}

impl Line {
    fn height(&self) -> i64 {
        match self {
            Line::Title(_) => 30,
            Line::Amount(_) => 32,
            Line::Heading(_) => 24,
            Line::Field(..) | Line::Text(_) => 16,
            Line::Rule => 14,
            Line::Blank => 10,
        }
    }
}

/// Renders fixed-layout PDF receipts for completed payments.
pub struct PdfReceiptRenderer {
    sender: SenderIdentity,
}

impl PdfReceiptRenderer {
    pub fn new(sender: SenderIdentity) -> Self {
        Self { sender }
    }

    /// Lines of the receipt. Identical inputs give identical lines.
    pub fn layout(
        &self,
        instruction: &PaymentInstruction,
        payment: &SubmittedPayment,
        issued_at: &DateTime<FixedOffset>,
    ) -> Result<Vec<Line>, RenderError> {
        let amount = instruction
            .amount()
            .map_err(|_| RenderError::MissingField("valor"))?;
        let key = instruction
            .recipient_key()
            .map_err(|_| RenderError::MissingField("chave"))?;

        let status = response_field(&payment.response, "tipoRetorno")
            .unwrap_or_else(|| "Pagamento enviado".to_string());
        let payment_date = instruction.payment_date(issued_at.date_naive());

        let mut lines = vec![
            Line::Title(TITLE.to_string()),
            Line::Field("Situação".into(), status),
            Line::Field("Emitido em".into(), format_timestamp(issued_at)),
            Line::Field("Data do pagamento".into(), format_date(&payment_date)),
            Line::Rule,
            Line::Heading("Valor".into()),
            Line::Amount(format_brl(amount.value())),
            Line::Field("Descrição".into(), instruction.description_or_default().to_string()),
            Line::Rule,
            Line::Heading("Dados do pagador".into()),
            Line::Field("Nome".into(), self.sender.name.clone()),
            Line::Field("CPF/CNPJ".into(), self.sender.document.clone()),
            Line::Field("Instituição".into(), self.sender.institution.clone()),
            Line::Field("Agência".into(), self.sender.agency.clone()),
        ];
        if let Some(account) = &self.sender.account {
            lines.push(Line::Field("Conta".into(), account.clone()));
        }

        lines.extend([
            Line::Rule,
            Line::Heading("Dados do recebedor".into()),
            Line::Field("Chave Pix".into(), mask_key(key, payment.key_type)),
            Line::Field("Tipo de chave".into(), payment.key_type.label().to_string()),
            Line::Rule,
            Line::Heading("Identificação da transação".into()),
        ]);
        for (field, label) in TRANSACTION_FIELDS {
            if let Some(value) = response_field(&payment.response, field) {
                lines.push(Line::Field(label.to_string(), value));
            }
        }
        lines.push(Line::Field(
            "Chave de idempotência".into(),
            payment.idempotency_key.to_string(),
        ));

        lines.push(Line::Blank);
        lines.push(Line::Rule);
        lines.extend(DISCLAIMER.iter().map(|t| Line::Text(t.to_string())));

        Ok(lines)
    }

    pub fn render_at(
        &self,
        instruction: &PaymentInstruction,
        payment: &SubmittedPayment,
        issued_at: &DateTime<FixedOffset>,
    ) -> Result<ReceiptDocument, RenderError> {
        let lines = self.layout(instruction, payment, issued_at)?;
        let bytes = encode_pdf(&lines)?;

        let short_id: String = payment
            .idempotency_key
            .simple()
            .to_string()
            .chars()
            .take(8)
            .collect();
        Ok(ReceiptDocument {
            bytes,
            filename: format!(
                "comprovante-pix-{}-{}.pdf",
                issued_at.format("%Y%m%d"),
                short_id
            ),
            content_type: PDF_CONTENT_TYPE.to_string(),
        })
    }
}

impl ReceiptRenderer for PdfReceiptRenderer {
    fn render(
        &self,
        instruction: &PaymentInstruction,
        payment: &SubmittedPayment,
    ) -> Result<ReceiptDocument, RenderError> {
        self.render_at(instruction, payment, &now_in_brasilia())
    }
}

fn response_field(response: &Value, field: &str) -> Option<String> {
    match response.get(field)? {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// PDF string in WinAnsi (Latin-1 compatible) encoding.
fn pdf_text(text: &str) -> Object {
    let bytes = text
        .chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect();
    Object::String(bytes, StringFormat::Literal)
}

/// Splits `text` into rows of at most `width` characters, breaking on
/// whitespace and hard-splitting words longer than a row.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut rows = Vec::new();
    let mut current = String::new();
    let pieces = text.split_whitespace().flat_map(|word| {
        let chars: Vec<char> = word.chars().collect();
        chars
            .chunks(width)
            .map(|chunk| chunk.iter().collect::<String>())
            .collect::<Vec<_>>()
    });
    for word in pieces {
        let word = word.as_str();
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
            rows.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() || rows.is_empty() {
        rows.push(current);
    }
    rows
}

fn text_at(ops: &mut Vec<Operation>, font: &str, size: i64, x: i64, y: i64, text: &str) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new("Tf", vec![font.into(), Object::Integer(size)]));
    ops.push(Operation::new("Td", vec![Object::Integer(x), Object::Integer(y)]));
    ops.push(Operation::new("Tj", vec![pdf_text(text)]));
    ops.push(Operation::new("ET", vec![]));
}

/// Accumulates drawing operations, starting a new page when the cursor
/// would cross the bottom margin.
struct PageWriter {
    pages: Vec<Vec<Operation>>,
    ops: Vec<Operation>,
    y: i64,
}

impl PageWriter {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            ops: Vec::new(),
            y: TOP_Y,
        }
    }

    /// Moves the cursor down by `height` and returns the new baseline.
    fn advance(&mut self, height: i64) -> i64 {
        if self.y - height < BOTTOM_Y && !self.ops.is_empty() {
            self.pages.push(std::mem::take(&mut self.ops));
            self.y = TOP_Y;
        }
        self.y -= height;
        self.y
    }

    fn finish(mut self) -> Vec<Vec<Operation>> {
        if !self.ops.is_empty() || self.pages.is_empty() {
            self.pages.push(self.ops);
        }
        self.pages
    }
}

/// Splits the lines into pages and draws each page's operations.
fn paginate(lines: &[Line]) -> Vec<Vec<Operation>> {
    let mut page = PageWriter::new();

    for line in lines {
        match line {
            Line::Title(text) => {
                let y = page.advance(line.height());
                text_at(&mut page.ops, "F2", 18, MARGIN_X, y, text);
            }
            Line::Amount(text) => {
                let y = page.advance(line.height());
                text_at(&mut page.ops, "F2", 22, MARGIN_X, y, text);
            }
            Line::Heading(text) => {
                let y = page.advance(line.height());
                text_at(&mut page.ops, "F2", 12, MARGIN_X, y, text);
            }
            Line::Text(text) => {
                let y = page.advance(line.height());
                text_at(&mut page.ops, "F1", 8, MARGIN_X, y, text);
            }
            Line::Field(label, value) => {
                for (i, row) in wrap(value, VALUE_WRAP).iter().enumerate() {
                    let y = page.advance(line.height());
                    if i == 0 {
                        text_at(&mut page.ops, "F2", 10, MARGIN_X, y, label);
                    }
                    text_at(&mut page.ops, "F1", 10, VALUE_X, y, row);
                }
            }
            Line::Rule => {
                let rule_y = page.advance(line.height()) + 6;
                page.ops.push(Operation::new("w", vec![Object::Real(0.5)]));
                page.ops.push(Operation::new(
                    "m",
                    vec![Object::Integer(MARGIN_X), Object::Integer(rule_y)],
                ));
                page.ops.push(Operation::new(
                    "l",
                    vec![
                        Object::Integer(PAGE_WIDTH - MARGIN_X),
                        Object::Integer(rule_y),
                    ],
                ));
                page.ops.push(Operation::new("S", vec![]));
            }
            Line::Blank => {
                page.advance(line.height());
            }
        }
    }

    page.finish()
}

fn encode_pdf(lines: &[Line]) -> Result<Vec<u8>, RenderError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular,
            "F2" => bold,
        },
    });

    let mut kids = Vec::new();
    for operations in paginate(lines) {
        let content = Content { operations }
            .encode()
            .map_err(|e| RenderError::Encoding(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(PAGE_WIDTH),
                Object::Integer(PAGE_HEIGHT),
            ],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| RenderError::Encoding(e.to_string()))?;
    Ok(bytes)
}
