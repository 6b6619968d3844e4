//! Business logic services

pub mod books;
pub mod fines;
pub mod loans;
pub mod visitors;

use std::sync::Arc;

use crate::{config::FineConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub repository: Repository,
    pub books: books::BookService,
    pub visitors: visitors::VisitorService,
    pub loans: loans::LoanWorkflow,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, fines: &FineConfig) -> Self {
        let books = books::BookService::new(repository.clone());
        let visitors = visitors::VisitorService::new(repository.clone());
        let loans = loans::LoanWorkflow::new(
            repository.clone(),
            Arc::new(books.clone()),
            Arc::new(visitors.clone()),
            Arc::new(fines::FineService::new(fines)),
        );

        Self {
            repository,
            books,
            visitors,
            loans,
        }
    }
}
