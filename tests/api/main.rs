mod brain;
mod health_check;
mod helpers;
