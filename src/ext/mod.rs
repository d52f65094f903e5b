pub mod ustr;
