pub mod catalog;
pub mod content;
pub mod order;
pub mod people;
pub mod settings;

pub use catalog::{Category, Product, ProductKey, WishlistEntry};
pub use content::{Banner, Notice, PushAudience, PushNotification};
pub use order::{
    BadgeColor, Costing, Order, OrderStatus, PaymentStatus, SettlementSummary, StatusFilter,
};
pub use people::{
    DailyCollection, DeliveryPartner, DeliveryReport, PartnerEarnings, ReportedOrder, Shop,
    ShopDailyEarnings, User,
};
pub use settings::{AppSettings, FeeChanges, FeeConfig};
