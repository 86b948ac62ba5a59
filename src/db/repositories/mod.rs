mod steps;
mod tasks;
mod users;
