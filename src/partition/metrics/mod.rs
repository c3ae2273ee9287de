mod demographic;
mod electoral;
mod geometric;
