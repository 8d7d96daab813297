pub mod chart;
pub mod data_table;
pub mod form;
pub mod header;
pub mod kpi;
pub mod modal;
pub mod select;
pub mod toast;
pub mod todo_list;
