mod eastmoney;
mod sina;

pub use eastmoney::EastmoneyAdapter;
pub use sina::SinaCalendarAdapter;
