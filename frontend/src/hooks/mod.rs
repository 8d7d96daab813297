pub mod use_page_data;
