pub mod user;
pub mod announcement;
pub mod expense;
pub mod tax;
pub mod ledger;

pub use user::{CurrentUser, Role, User, UserStatus, UserView};
pub use announcement::{Announcement, AnnouncementStatus, AnnouncementView};
pub use expense::{Expense, ExpenseView, MonthlyExpense, YearlyExpense};
pub use tax::{Tax, TaxView};
