use crate::domain::instruction::PaymentInstruction;
use crate::domain::outcome::{BatchReport, ItemResult, PaymentOutcome, SubmittedPayment};
use crate::domain::ports::{
    AuthenticatorBox, PacerBox, PaymentSubmitterBox, ReceiptPublisherBox, ReceiptRendererBox,
};
use crate::domain::receipt::ReceiptLocator;
use crate::domain::token::AccessToken;
use crate::error::AuthError;
use tracing::{error, info, warn};

/// Drives a batch of Pix payments from authentication to the aggregate report.
///
/// Items are processed strictly in input order, one at a time, with the
/// injected [`Pacer`](crate::domain::ports::Pacer) invoked between items.
/// Only authentication is batch-fatal; every later failure is recorded on the
/// item it belongs to.
pub struct BatchOrchestrator {
    authenticator: AuthenticatorBox,
    submitter: PaymentSubmitterBox,
    renderer: ReceiptRendererBox,
    publisher: ReceiptPublisherBox,
    pacer: PacerBox,
}

impl BatchOrchestrator {
    /// Creates a new `BatchOrchestrator` from its collaborators.
    pub fn new(
        authenticator: AuthenticatorBox,
        submitter: PaymentSubmitterBox,
        renderer: ReceiptRendererBox,
        publisher: ReceiptPublisherBox,
        pacer: PacerBox,
    ) -> Self {
        Self {
            authenticator,
            submitter,
            renderer,
            publisher,
            pacer,
        }
    }

    /// Processes every instruction and returns one outcome per instruction, in order.
    ///
    /// Fails only when the token exchange fails, in which case no instruction
    /// is attempted.
    pub async fn process_batch(
        &self,
        instructions: &[PaymentInstruction],
    ) -> Result<BatchReport, AuthError> {
        info!(items = instructions.len(), "starting payment batch");

        let token = self.authenticator.authenticate().await.inspect_err(|e| {
            error!(error = %e, "authentication failed, aborting batch");
        })?;

        let mut results = Vec::with_capacity(instructions.len());
        for (index, instruction) in instructions.iter().enumerate() {
            if index > 0 {
                self.pacer.pause().await;
            }
            let outcome = self.process_item(&token, index, instruction).await;
            results.push(ItemResult {
                key: instruction.key.clone(),
                outcome,
            });
        }

        let report = BatchReport::from_results(results);
        info!(
            total = report.total,
            succeeded = report.succeeded,
            failed = report.failed,
            "payment batch finished"
        );
        Ok(report)
    }

    async fn process_item(
        &self,
        token: &AccessToken,
        index: usize,
        instruction: &PaymentInstruction,
    ) -> PaymentOutcome {
        if let Err(e) = instruction.validate() {
            warn!(item = index, error = %e, "payment instruction rejected");
            return PaymentOutcome::Failed {
                reason: e.to_string(),
                details: None,
            };
        }
        if token.is_expired() {
            warn!(item = index, "access token expired during the batch, submitting anyway");
        }

        let payment = match self.submitter.submit(token, instruction).await {
            Ok(payment) => payment,
            Err(e) => {
                warn!(item = index, error = %e, "payment failed");
                return PaymentOutcome::Failed {
                    reason: e.to_string(),
                    details: e.details().cloned(),
                };
            }
        };

        info!(
            item = index,
            idempotency_key = %payment.idempotency_key,
            key_type = %payment.key_type,
            "payment accepted"
        );

        let receipt = self.issue_receipt(index, instruction, &payment).await;
        PaymentOutcome::succeeded(payment, receipt)
    }

    /// Renders and publishes the receipt. Any failure only drops the receipt.
    async fn issue_receipt(
        &self,
        index: usize,
        instruction: &PaymentInstruction,
        payment: &SubmittedPayment,
    ) -> Option<ReceiptLocator> {
        let document = match self.renderer.render(instruction, payment) {
            Ok(document) => document,
            Err(e) => {
                warn!(item = index, error = %e, "receipt rendering failed");
                return None;
            }
        };

        match self.publisher.publish(document).await {
            Ok(locator) => Some(locator),
            Err(e) => {
                warn!(item = index, error = %e, "receipt publishing failed");
                None
            }
        }
    }
}
