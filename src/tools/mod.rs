pub mod roll_dice;
