//! Inventory rules

use crate::models::Book;

/// A book can be issued while at least one copy is on the shelf.
pub fn can_issue(book: &Book) -> bool {
    book.quantity > 0
}

/// Quantity transition for issuing one copy. The stores encode the same
/// transition as a guarded conditional update.
pub fn apply_issue(book: Book) -> Book {
    Book {
        quantity: book.quantity - 1,
        ..book
    }
}

/// Quantity transition for returning one copy.
pub fn apply_return(book: Book) -> Book {
    Book {
        quantity: book.quantity + 1,
        ..book
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn book(quantity: i32) -> Book {
        let now = Utc::now();
        Book {
            id: 1,
            title: "The Dispossessed".into(),
            author: "Ursula K. Le Guin".into(),
            isbn: "9780061054884".into(),
            quantity,
            publisher: None,
            image_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn issuable_only_with_stock() {
        assert!(can_issue(&book(1)));
        assert!(!can_issue(&book(0)));
    }

    #[test]
    fn issue_and_return_are_inverse() {
        let b = book(3);
        let issued = apply_issue(b.clone());
        assert_eq!(issued.quantity, 2);
        assert_eq!(apply_return(issued).quantity, b.quantity);
    }
}
