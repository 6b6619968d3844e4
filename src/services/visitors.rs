//! Visitor management and debt ledger

use async_trait::async_trait;
use rust_decimal::Decimal;
use validator::Validate;

use crate::{
    error::{AppResult, LibraryError},
    models::{
        visitor::{CreateVisitor, UpdateVisitor},
        LoanEvent, NewLoanEvent, NewVisitor, Visitor,
    },
    repository::{Repository, Session},
};

/// Visitor debt balance and loan history.
///
/// Every operation works inside the caller's session; nothing is committed here.
#[async_trait]
pub trait VisitorLedger: Send + Sync {
    /// Load a visitor with its history, failing with `NotFound` when missing
    async fn get_visitor(&self, session: &mut dyn Session, visitor_id: i32) -> AppResult<Visitor>;

    /// Add a strictly positive fine to the visitor's debt
    async fn add_fine_to_debt(
        &self,
        session: &mut dyn Session,
        visitor_id: i32,
        fine: Decimal,
    ) -> AppResult<Visitor>;

    /// Clear the visitor's debt; partial payments are not supported
    async fn pay_off_debt(&self, session: &mut dyn Session, visitor_id: i32) -> AppResult<Visitor>;

    /// Record a loan event and append it to the visitor's history
    async fn attach_loan_event(
        &self,
        session: &mut dyn Session,
        visitor_id: i32,
        event: NewLoanEvent,
    ) -> AppResult<LoanEvent>;
}

#[derive(Clone)]
pub struct VisitorService {
    repository: Repository,
}

impl VisitorService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn create(&self, data: CreateVisitor) -> AppResult<Visitor> {
        data.validate()?;

        let mut session = self.repository.begin().await?;
        let visitor = session.insert_visitor(&NewVisitor::from(data)).await?;
        session.commit().await?;

        tracing::info!(
            "Visitor {} {} registered with id {}",
            visitor.name,
            visitor.surname,
            visitor.id
        );
        Ok(visitor)
    }

    pub async fn get(&self, id: i32) -> AppResult<Visitor> {
        let mut session = self.repository.begin().await?;
        self.get_visitor(session.as_mut(), id).await
    }

    pub async fn list(&self) -> AppResult<Vec<Visitor>> {
        let mut session = self.repository.begin().await?;
        session.list_visitors().await
    }

    /// Update contact details; debt and history are left untouched
    pub async fn update(&self, id: i32, data: UpdateVisitor) -> AppResult<Visitor> {
        data.validate()?;

        let mut session = self.repository.begin().await?;
        let mut visitor = self.get_visitor(session.as_mut(), id).await?;
        visitor.name = data.name;
        visitor.surname = data.surname;
        visitor.email = data.email;
        session.update_visitor(&visitor).await?;
        session.commit().await?;

        tracing::info!("Visitor {} updated", id);
        Ok(visitor)
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let mut session = self.repository.begin().await?;
        if !session.delete_visitor(id).await? {
            return Err(LibraryError::visitor_not_found(id).into());
        }
        session.commit().await?;

        tracing::info!("Visitor {} deleted", id);
        Ok(())
    }

    /// Pay off a visitor's whole debt in its own unit of work
    pub async fn settle_debt(&self, id: i32) -> AppResult<Visitor> {
        let mut session = self.repository.begin().await?;
        let visitor = self.pay_off_debt(session.as_mut(), id).await?;
        session.commit().await?;
        Ok(visitor)
    }
}

#[async_trait]
impl VisitorLedger for VisitorService {
    async fn get_visitor(&self, session: &mut dyn Session, visitor_id: i32) -> AppResult<Visitor> {
        session
            .find_visitor(visitor_id)
            .await?
            .ok_or_else(|| LibraryError::visitor_not_found(visitor_id).into())
    }

    async fn add_fine_to_debt(
        &self,
        session: &mut dyn Session,
        visitor_id: i32,
        fine: Decimal,
    ) -> AppResult<Visitor> {
        let mut visitor = self.get_visitor(session, visitor_id).await?;
        visitor.add_fine_to_debt(fine)?;
        session.update_visitor(&visitor).await?;

        tracing::info!("Visitor {} fined {}, debt is now {}", visitor_id, fine, visitor.debt);
        Ok(visitor)
    }

    async fn pay_off_debt(&self, session: &mut dyn Session, visitor_id: i32) -> AppResult<Visitor> {
        let mut visitor = self.get_visitor(session, visitor_id).await?;
        let paid = visitor.debt;
        visitor.pay_off_debt();
        session.update_visitor(&visitor).await?;

        tracing::info!("Visitor {} paid off a debt of {}", visitor_id, paid);
        Ok(visitor)
    }

    async fn attach_loan_event(
        &self,
        session: &mut dyn Session,
        visitor_id: i32,
        event: NewLoanEvent,
    ) -> AppResult<LoanEvent> {
        let mut visitor = self.get_visitor(session, visitor_id).await?;
        let event = session.insert_loan_event(&event).await?;
        visitor.attach(event.clone());
        session.update_visitor(&visitor).await?;
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::error::AppError;

    fn request() -> CreateVisitor {
        CreateVisitor {
            name: "Grace".to_string(),
            surname: "Hopper".to_string(),
            email: "grace@example.org".to_string(),
        }
    }

    async fn service_with_visitor() -> (VisitorService, Visitor) {
        let service = VisitorService::new(Repository::in_memory());
        let visitor = service.create(request()).await.unwrap();
        (service, visitor)
    }

    async fn fine(service: &VisitorService, id: i32, amount: Decimal) -> AppResult<Visitor> {
        let mut session = service.repository.begin().await?;
        let visitor = service.add_fine_to_debt(session.as_mut(), id, amount).await?;
        session.commit().await?;
        Ok(visitor)
    }

    #[tokio::test]
    async fn test_new_visitor_has_no_debt() {
        let (_, visitor) = service_with_visitor().await;
        assert_eq!(visitor.debt, Decimal::ZERO);
        assert!(visitor.loan_events.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_email_rejected() {
        let service = VisitorService::new(Repository::in_memory());
        let mut data = request();
        data.email = "grace".to_string();
        assert!(matches!(service.create(data).await, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_fine_then_settle() {
        let (service, visitor) = service_with_visitor().await;

        fine(&service, visitor.id, Decimal::new(35, 1)).await.unwrap();
        fine(&service, visitor.id, Decimal::new(15, 1)).await.unwrap();
        assert_eq!(service.get(visitor.id).await.unwrap().debt, Decimal::new(5, 0));

        let settled = service.settle_debt(visitor.id).await.unwrap();
        assert_eq!(settled.debt, Decimal::ZERO);
        assert_eq!(service.get(visitor.id).await.unwrap().debt, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_non_positive_fine_rejected() {
        let (service, visitor) = service_with_visitor().await;

        let err = fine(&service, visitor.id, Decimal::ZERO).await.unwrap_err();
        assert_eq!(
            err.library(),
            Some(&LibraryError::InvalidFineAmount(Decimal::ZERO))
        );
    }

    #[tokio::test]
    async fn test_fine_for_missing_visitor() {
        let service = VisitorService::new(Repository::in_memory());
        let err = fine(&service, 9, Decimal::ONE).await.unwrap_err();
        assert_eq!(err.library(), Some(&LibraryError::visitor_not_found(9)));
    }

    #[tokio::test]
    async fn test_attach_loan_event() {
        let (service, visitor) = service_with_visitor().await;
        let day = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();

        let mut session = service.repository.begin().await.unwrap();
        let event = service
            .attach_loan_event(
                session.as_mut(),
                visitor.id,
                NewLoanEvent::borrowed(visitor.id, 3, day),
            )
            .await
            .unwrap();
        session.commit().await.unwrap();

        let loaded = service.get(visitor.id).await.unwrap();
        assert_eq!(loaded.loan_events, vec![event]);
    }

    #[tokio::test]
    async fn test_update_keeps_debt() {
        let (service, visitor) = service_with_visitor().await;
        fine(&service, visitor.id, Decimal::ONE).await.unwrap();

        let mut data = request();
        data.email = "hopper@example.org".to_string();
        let updated = service.update(visitor.id, data).await.unwrap();

        assert_eq!(updated.email, "hopper@example.org");
        assert_eq!(updated.debt, Decimal::ONE);
    }

    #[tokio::test]
    async fn test_delete_visitor() {
        let (service, visitor) = service_with_visitor().await;
        service.delete(visitor.id).await.unwrap();
        assert!(service.get(visitor.id).await.is_err());
        assert!(service.delete(visitor.id).await.is_err());
    }
}
