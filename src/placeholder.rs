//! Fixed records used only by the seed endpoint.
//!
//! Every record carries its primary key so that re-seeding hits the
//! conflict clause instead of inserting duplicates.

pub struct PlaceholderUser {
    pub id: &'static str,
    pub name: &'static str,
    pub email: &'static str,
    pub password: &'static str,
}

pub struct PlaceholderCustomer {
    pub id: &'static str,
    pub name: &'static str,
    pub email: &'static str,
    pub image_url: &'static str,
}

pub struct PlaceholderInvoice {
    pub id: &'static str,
    pub customer_id: &'static str,
    pub amount: i64,
    pub status: &'static str,
    pub date: &'static str,
}

pub struct PlaceholderRevenue {
    pub month: &'static str,
    pub revenue: i64,
}

pub struct PlaceholderStock {
    pub ticker: &'static str,
    pub company_name: &'static str,
    pub market: &'static str,
    pub stock_type: &'static str,
    pub currency_code: &'static str,
}

/// `conversion_rate` is CNY per one unit of the currency.
pub struct PlaceholderCurrency {
    pub currency_code: &'static str,
    pub currency_name: &'static str,
    pub conversion_rate: f64,
}

pub const USERS: &[PlaceholderUser] = &[
    PlaceholderUser {
        id: "410544b2-4001-4271-9855-fec4b6a6442a",
        name: "User",
        email: "user@nextmail.com",
        password: "123456",
    },
    PlaceholderUser {
        id: "a1f7c0de-3b52-4e0e-9d3c-6b0f2b7e9a11",
        name: "Admin",
        email: "admin@admin.com",
        password: "admin123",
    },
];

const EVIL_RABBIT: &str = "d6e15727-9fe1-4961-8c5b-ea44a9bd81aa";
const DELBA: &str = "3958dc9e-712f-4377-85e9-fec4b6a6442a";
const LEE: &str = "3958dc9e-742f-4377-85e9-fec4b6a6442a";
const MICHAEL: &str = "76d65c26-f784-44a2-ac19-586678f7c2f2";
const AMY: &str = "cc27c14a-0acf-4f4a-a6c9-d45682c144b9";
const BALAZS: &str = "13d07535-c59e-4157-a011-f8d2ef4e0cbb";

pub const CUSTOMERS: &[PlaceholderCustomer] = &[
    PlaceholderCustomer {
        id: EVIL_RABBIT,
        name: "Evil Rabbit",
        email: "evil@rabbit.com",
        image_url: "/static/customers/evil-rabbit.png",
    },
    PlaceholderCustomer {
        id: DELBA,
        name: "Delba de Oliveira",
        email: "delba@oliveira.com",
        image_url: "/static/customers/delba-de-oliveira.png",
    },
    PlaceholderCustomer {
        id: LEE,
        name: "Lee Robinson",
        email: "lee@robinson.com",
        image_url: "/static/customers/lee-robinson.png",
    },
    PlaceholderCustomer {
        id: MICHAEL,
        name: "Michael Novotny",
        email: "michael@novotny.com",
        image_url: "/static/customers/michael-novotny.png",
    },
    PlaceholderCustomer {
        id: AMY,
        name: "Amy Burns",
        email: "amy@burns.com",
        image_url: "/static/customers/amy-burns.png",
    },
    PlaceholderCustomer {
        id: BALAZS,
        name: "Balazs Orban",
        email: "balazs@orban.com",
        image_url: "/static/customers/balazs-orban.png",
    },
];

pub const INVOICES: &[PlaceholderInvoice] = &[
    PlaceholderInvoice {
        id: "2f0c4f3e-0a57-4d7c-9a1e-01a6d3c5e001",
        customer_id: EVIL_RABBIT,
        amount: 15795,
        status: "pending",
        date: "2022-12-06",
    },
    PlaceholderInvoice {
        id: "2f0c4f3e-0a57-4d7c-9a1e-01a6d3c5e002",
        customer_id: DELBA,
        amount: 20348,
        status: "pending",
        date: "2022-11-14",
    },
    PlaceholderInvoice {
        id: "2f0c4f3e-0a57-4d7c-9a1e-01a6d3c5e003",
        customer_id: AMY,
        amount: 3040,
        status: "paid",
        date: "2022-10-29",
    },
    PlaceholderInvoice {
        id: "2f0c4f3e-0a57-4d7c-9a1e-01a6d3c5e004",
        customer_id: MICHAEL,
        amount: 44800,
        status: "paid",
        date: "2023-09-10",
    },
    PlaceholderInvoice {
        id: "2f0c4f3e-0a57-4d7c-9a1e-01a6d3c5e005",
        customer_id: BALAZS,
        amount: 34577,
        status: "pending",
        date: "2023-08-05",
    },
    PlaceholderInvoice {
        id: "2f0c4f3e-0a57-4d7c-9a1e-01a6d3c5e006",
        customer_id: LEE,
        amount: 54246,
        status: "pending",
        date: "2023-07-16",
    },
    PlaceholderInvoice {
        id: "2f0c4f3e-0a57-4d7c-9a1e-01a6d3c5e007",
        customer_id: EVIL_RABBIT,
        amount: 666,
        status: "pending",
        date: "2023-06-27",
    },
    PlaceholderInvoice {
        id: "2f0c4f3e-0a57-4d7c-9a1e-01a6d3c5e008",
        customer_id: MICHAEL,
        amount: 32545,
        status: "paid",
        date: "2023-06-09",
    },
    PlaceholderInvoice {
        id: "2f0c4f3e-0a57-4d7c-9a1e-01a6d3c5e009",
        customer_id: AMY,
        amount: 1250,
        status: "paid",
        date: "2023-06-17",
    },
    PlaceholderInvoice {
        id: "2f0c4f3e-0a57-4d7c-9a1e-01a6d3c5e010",
        customer_id: BALAZS,
        amount: 8546,
        status: "paid",
        date: "2023-06-07",
    },
    PlaceholderInvoice {
        id: "2f0c4f3e-0a57-4d7c-9a1e-01a6d3c5e011",
        customer_id: DELBA,
        amount: 500,
        status: "paid",
        date: "2023-08-19",
    },
    PlaceholderInvoice {
        id: "2f0c4f3e-0a57-4d7c-9a1e-01a6d3c5e012",
        customer_id: BALAZS,
        amount: 8945,
        status: "paid",
        date: "2023-06-03",
    },
    PlaceholderInvoice {
        id: "2f0c4f3e-0a57-4d7c-9a1e-01a6d3c5e013",
        customer_id: LEE,
        amount: 1000,
        status: "paid",
        date: "2022-06-05",
    },
];

pub const REVENUE: &[PlaceholderRevenue] = &[
    PlaceholderRevenue { month: "Jan", revenue: 2000 },
    PlaceholderRevenue { month: "Feb", revenue: 1800 },
    PlaceholderRevenue { month: "Mar", revenue: 2200 },
    PlaceholderRevenue { month: "Apr", revenue: 2500 },
    PlaceholderRevenue { month: "May", revenue: 2300 },
    PlaceholderRevenue { month: "Jun", revenue: 3200 },
    PlaceholderRevenue { month: "Jul", revenue: 3500 },
    PlaceholderRevenue { month: "Aug", revenue: 3700 },
    PlaceholderRevenue { month: "Sep", revenue: 2500 },
    PlaceholderRevenue { month: "Oct", revenue: 2800 },
    PlaceholderRevenue { month: "Nov", revenue: 3000 },
    PlaceholderRevenue { month: "Dec", revenue: 4800 },
];

pub const CURRENCIES: &[PlaceholderCurrency] = &[
    PlaceholderCurrency {
        currency_code: "CNY",
        currency_name: "Chinese Yuan",
        conversion_rate: 1.0,
    },
    PlaceholderCurrency {
        currency_code: "USD",
        currency_name: "US Dollar",
        conversion_rate: 7.124_500,
    },
    PlaceholderCurrency {
        currency_code: "HKD",
        currency_name: "Hong Kong Dollar",
        conversion_rate: 0.911_200,
    },
    PlaceholderCurrency {
        currency_code: "EUR",
        currency_name: "Euro",
        conversion_rate: 7.751_300,
    },
    PlaceholderCurrency {
        currency_code: "JPY",
        currency_name: "Japanese Yen",
        conversion_rate: 0.048_100,
    },
];

pub const STOCKS: &[PlaceholderStock] = &[
    PlaceholderStock {
        ticker: "AAPL",
        company_name: "Apple Inc.",
        market: "NASDAQ",
        stock_type: "common",
        currency_code: "USD",
    },
    PlaceholderStock {
        ticker: "MSFT",
        company_name: "Microsoft Corporation",
        market: "NASDAQ",
        stock_type: "common",
        currency_code: "USD",
    },
    PlaceholderStock {
        ticker: "0700.HK",
        company_name: "Tencent Holdings Ltd.",
        market: "HKEX",
        stock_type: "common",
        currency_code: "HKD",
    },
    PlaceholderStock {
        ticker: "600519.SS",
        company_name: "Kweichow Moutai Co., Ltd.",
        market: "SSE",
        stock_type: "A-share",
        currency_code: "CNY",
    },
    PlaceholderStock {
        ticker: "SAP.DE",
        company_name: "SAP SE",
        market: "XETRA",
        stock_type: "common",
        currency_code: "EUR",
    },
    PlaceholderStock {
        ticker: "7203.T",
        company_name: "Toyota Motor Corporation",
        market: "TSE",
        stock_type: "common",
        currency_code: "JPY",
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn references_resolve() {
        let customers: HashSet<_> = CUSTOMERS.iter().map(|c| c.id).collect();
        assert!(INVOICES.iter().all(|i| customers.contains(i.customer_id)));

        let currencies: HashSet<_> = CURRENCIES.iter().map(|c| c.currency_code).collect();
        assert!(STOCKS.iter().all(|s| currencies.contains(s.currency_code)));
    }

    #[test]
    fn keys_are_unique() {
        let ids: HashSet<_> = INVOICES.iter().map(|i| i.id).collect();
        assert_eq!(ids.len(), INVOICES.len());
        let months: HashSet<_> = REVENUE.iter().map(|r| r.month).collect();
        assert_eq!(months.len(), REVENUE.len());
        let tickers: HashSet<_> = STOCKS.iter().map(|s| s.ticker).collect();
        assert_eq!(tickers.len(), STOCKS.len());
    }
}
