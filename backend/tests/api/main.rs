mod auth_test;
mod category_test;
mod helpers;
mod user_test;
