//! Sample preparation reminders shown before an acquisition.

pub const TITLE: &str = "Sample Prep Reminders";

pub const REMINDERS: [&str; 8] = [
    "Use shiny side of tin foil",
    "Wrap foil neatly & diagonally",
    "Amount of solution used should ~= 0.5 mL",
    "Step size of pump should be 125R",
    "Set current to 14 microAmps",
    "Revolution voltage is 3V",
    "Run electrospinner for 20 minutes",
    "Wear gloves when handling samples",
];
