mod check;
mod evaluate;
mod widgets;
