pub mod core {
    pub mod value;
}

pub mod pagination {
    pub mod cursor;
    pub mod order_value;
    pub mod page;
}

pub mod records {
    pub mod record;
    pub mod row;
}
