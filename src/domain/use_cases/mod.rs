pub mod answer_query;
pub mod route_query;
